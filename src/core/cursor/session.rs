//! Traversal session state
//!
//! Counters that outlive a single resolution: the eviction offset and the
//! section ledger. Threaded as `&mut` through the resolver, the eviction
//! manager and the batch controller so every surface step happens in order.

use super::ledger::SectionLedger;
use crate::config::ResolveStrategy;
use crate::domain::GlobalIndex;

/// Mutable traversal state for one run
#[derive(Debug, Clone)]
pub struct TraversalSession {
    strategy: ResolveStrategy,
    eviction_offset: u64,
    kept_from: Option<GlobalIndex>,
    ledger: SectionLedger,
}

impl TraversalSession {
    pub fn new(strategy: ResolveStrategy) -> Self {
        Self {
            strategy,
            eviction_offset: 0,
            kept_from: None,
            ledger: SectionLedger::new(),
        }
    }

    pub fn strategy(&self) -> ResolveStrategy {
        self.strategy
    }

    /// Items removed from the front of the window since the list was loaded
    pub fn eviction_offset(&self) -> u64 {
        self.eviction_offset
    }

    /// Whether `index` has already been removed from the window
    pub fn is_evicted(&self, index: GlobalIndex) -> bool {
        index.value() < self.eviction_offset
    }

    /// Record `removed` items evicted from the front
    pub fn record_eviction(&mut self, removed: usize) {
        self.eviction_offset += removed as u64;
    }

    /// Keep items from `index` onward out of reach of eviction
    pub fn keep_from(&mut self, index: GlobalIndex) {
        self.kept_from = Some(index);
    }

    /// Lowest index that must stay materialized, if any
    pub fn kept_from(&self) -> Option<GlobalIndex> {
        self.kept_from
    }

    pub fn ledger(&self) -> &SectionLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut SectionLedger {
        &mut self.ledger
    }

    /// Reset after the list has been reloaded
    pub fn reset(&mut self) {
        self.eviction_offset = 0;
        self.kept_from = None;
        self.ledger.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IntrinsicPosition;

    #[test]
    fn test_eviction_offset_accumulates_and_resets() {
        let mut session = TraversalSession::new(ResolveStrategy::Contiguous);
        session.record_eviction(10);
        session.record_eviction(5);
        assert_eq!(session.eviction_offset(), 15);
        assert!(session.is_evicted(GlobalIndex::new(14)));
        assert!(!session.is_evicted(GlobalIndex::new(15)));

        session.ledger_mut().observe(IntrinsicPosition::new(1, 3));
        session.keep_from(GlobalIndex::new(20));
        assert_eq!(session.kept_from(), Some(GlobalIndex::new(20)));
        session.reset();
        assert_eq!(session.eviction_offset(), 0);
        assert_eq!(session.kept_from(), None);
        assert_eq!(session.ledger().sections(), 0);
    }
}
