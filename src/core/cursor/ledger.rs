//! Section ledger
//!
//! Maps intrinsic `(section, offset)` positions onto the dense global index:
//! `GlobalIndex = (sum of the max offset of every earlier section) + offset - 1`.
//!
//! Maxima are remembered for the whole traversal, so the rule keeps holding
//! after earlier sections have been evicted from the window.

use crate::domain::{GlobalIndex, IntrinsicPosition};
use std::collections::BTreeMap;

/// Highest offset observed per section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionLedger {
    maxima: BTreeMap<u32, u32>,
}

impl SectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a position, raising its section maximum if needed
    pub fn observe(&mut self, position: IntrinsicPosition) {
        let max = self.maxima.entry(position.section).or_insert(0);
        if position.offset > *max {
            *max = position.offset;
        }
    }

    /// Global index of a position under the accumulation rule
    ///
    /// # Examples
    ///
    /// ```
    /// use gallery_export::core::cursor::SectionLedger;
    /// use gallery_export::domain::{GlobalIndex, IntrinsicPosition};
    ///
    /// let mut ledger = SectionLedger::new();
    /// for offset in 1..=3 {
    ///     ledger.observe(IntrinsicPosition::new(1, offset));
    /// }
    /// ledger.observe(IntrinsicPosition::new(2, 1));
    ///
    /// assert_eq!(ledger.global_index(IntrinsicPosition::new(2, 1)), GlobalIndex::new(3));
    /// ```
    pub fn global_index(&self, position: IntrinsicPosition) -> GlobalIndex {
        let prior: u64 = self
            .maxima
            .range(..position.section)
            .map(|(_, max)| u64::from(*max))
            .sum();
        GlobalIndex::new((prior + u64::from(position.offset)).saturating_sub(1))
    }

    /// Number of sections seen so far
    pub fn sections(&self) -> usize {
        self.maxima.len()
    }

    /// Forget everything, used when the list is reloaded
    pub fn clear(&mut self) {
        self.maxima.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe_all(ledger: &mut SectionLedger, sections: &[u32]) -> Vec<GlobalIndex> {
        let positions: Vec<IntrinsicPosition> = sections
            .iter()
            .enumerate()
            .flat_map(|(i, count)| {
                (1..=*count).map(move |o| IntrinsicPosition::new(i as u32 + 1, o))
            })
            .collect();
        for p in &positions {
            ledger.observe(*p);
        }
        positions.iter().map(|p| ledger.global_index(*p)).collect()
    }

    #[test]
    fn test_accumulation_is_dense_and_increasing() {
        let mut ledger = SectionLedger::new();
        let indices = observe_all(&mut ledger, &[3, 1, 5, 2]);

        let expected: Vec<GlobalIndex> = (0..11).map(GlobalIndex::new).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn test_first_section_starts_at_zero() {
        let mut ledger = SectionLedger::new();
        ledger.observe(IntrinsicPosition::new(7, 1));
        assert_eq!(
            ledger.global_index(IntrinsicPosition::new(7, 1)),
            GlobalIndex::ZERO
        );
    }

    #[test]
    fn test_maxima_survive_out_of_order_observation() {
        let mut ledger = SectionLedger::new();
        ledger.observe(IntrinsicPosition::new(1, 4));
        ledger.observe(IntrinsicPosition::new(1, 2));
        ledger.observe(IntrinsicPosition::new(2, 1));

        assert_eq!(
            ledger.global_index(IntrinsicPosition::new(2, 1)),
            GlobalIndex::new(4)
        );
        assert_eq!(ledger.sections(), 2);
    }

    #[test]
    fn test_clear() {
        let mut ledger = SectionLedger::new();
        observe_all(&mut ledger, &[2, 2]);
        ledger.clear();
        assert_eq!(ledger.sections(), 0);
    }
}
