//! Index resolver
//!
//! Maps a global index to a currently materialized item, scrolling to trigger
//! loading when the item isn't materialized yet. With an eviction manager
//! attached, items below the target are evicted while scrolling so the window
//! stays bounded even when the target lies far ahead.

use super::session::TraversalSession;
use crate::adapters::surface::{ElementHandle, ScrollBehavior};
use crate::config::{ResolveStrategy, TraversalConfig};
use crate::core::window::{EvictionManager, SnapshotReader};
use crate::domain::{ExporterError, GlobalIndex, IntrinsicPosition};
use std::time::Duration;
use tokio::time::sleep;

/// A resolved list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemHandle {
    /// Global index the item was resolved for
    pub index: GlobalIndex,
    /// Surface handle
    pub element: ElementHandle,
    /// Identifier, when it was read during resolution
    pub id: Option<String>,
    /// Intrinsic position, when it was read during resolution
    pub position: Option<IntrinsicPosition>,
}

/// Outcome of resolving one index
#[derive(Debug)]
pub enum Resolution {
    /// The item is materialized
    Resolved(ItemHandle),
    /// Scrolling stopped producing new items: the list is exhausted
    EndOfList,
    /// The index lies before the live window
    Evicted,
    /// Surface errors persisted past the tolerance
    Transient(ExporterError),
}

impl Resolution {
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Resolved(_) => "resolved",
            Resolution::EndOfList => "end_of_list",
            Resolution::Evicted => "evicted",
            Resolution::Transient(_) => "transient",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Progress {
    Grew,
    Unchanged,
    Stalled,
}

/// Counts consecutive polls without growth of the loaded extent
#[derive(Debug)]
struct StallTracker {
    threshold: u32,
    best: Option<u64>,
    stalls: u32,
}

impl StallTracker {
    fn new(threshold: u32) -> Self {
        Self {
            threshold,
            best: None,
            stalls: 0,
        }
    }

    fn observe(&mut self, extent: u64) -> Progress {
        if self.best.map_or(true, |best| extent > best) {
            self.best = Some(extent);
            self.stalls = 0;
            return Progress::Grew;
        }
        self.stalls += 1;
        if self.stalls > self.threshold {
            Progress::Stalled
        } else {
            Progress::Unchanged
        }
    }
}

/// Resolves global indices against the live window
#[derive(Clone)]
pub struct IndexResolver {
    reader: SnapshotReader,
    stall_threshold: u32,
    poll_interval: Duration,
    max_transient_errors: u32,
    eviction: Option<EvictionManager>,
}

impl IndexResolver {
    pub fn new(
        reader: SnapshotReader,
        stall_threshold: u32,
        poll_interval: Duration,
        max_transient_errors: u32,
    ) -> Self {
        Self {
            reader,
            stall_threshold,
            poll_interval,
            max_transient_errors,
            eviction: None,
        }
    }

    pub fn from_config(reader: SnapshotReader, config: &TraversalConfig) -> Self {
        Self::new(
            reader,
            config.stall_threshold,
            config.poll_interval(),
            config.max_transient_errors,
        )
    }

    /// Evict below the target while scrolling past the window cap
    pub fn with_eviction(mut self, eviction: EvictionManager) -> Self {
        self.eviction = Some(eviction);
        self
    }

    pub fn reader(&self) -> &SnapshotReader {
        &self.reader
    }

    /// Consecutive surface errors tolerated
    pub fn max_transient_errors(&self) -> u32 {
        self.max_transient_errors
    }

    /// Delay between polls
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Resolve `index` to a materialized item
    ///
    /// Never fails: list exhaustion, eviction and persistent surface errors
    /// are all reported through [`Resolution`].
    pub async fn resolve(&self, session: &mut TraversalSession, index: GlobalIndex) -> Resolution {
        if session.is_evicted(index) {
            tracing::warn!(
                index = %index,
                eviction_offset = session.eviction_offset(),
                "Index already evicted"
            );
            return Resolution::Evicted;
        }

        let resolution = match session.strategy() {
            ResolveStrategy::Contiguous => self.resolve_contiguous(session, index).await,
            ResolveStrategy::Positional => self.resolve_positional(session, index).await,
        };

        tracing::trace!(index = %index, resolution = resolution.label(), "Resolved index");
        resolution
    }

    /// Materialized items are assumed contiguous and persistent: local
    /// position is `index - eviction_offset`
    async fn resolve_contiguous(
        &self,
        session: &mut TraversalSession,
        index: GlobalIndex,
    ) -> Resolution {
        let mut tracker = StallTracker::new(self.stall_threshold);
        let mut errors = 0;

        loop {
            let offset = session.eviction_offset();
            let Some(local) = index.local_position(offset) else {
                return Resolution::Evicted;
            };

            let handles = match self.reader.handles().await {
                Ok(handles) => handles,
                Err(e) => {
                    if let Some(failed) = self.tolerate(&mut errors, e) {
                        return failed;
                    }
                    sleep(self.poll_interval).await;
                    continue;
                }
            };

            if let Some(element) = handles.get(local) {
                return Resolution::Resolved(ItemHandle {
                    index,
                    element: element.clone(),
                    id: None,
                    position: None,
                });
            }

            let extent = offset + handles.len() as u64;
            match tracker.observe(extent) {
                Progress::Grew => {
                    tracing::debug!(index = %index, loaded = extent, "Scrolling to load more items");
                    if handles.len() > self.window_cap() {
                        let bound = Self::eviction_bound(session, index);
                        let limit = bound.value().saturating_sub(offset);
                        self.evict_ahead(session, usize::try_from(limit).unwrap_or(usize::MAX))
                            .await;
                    }
                    if let Some(last) = handles.last() {
                        if let Err(e) = self
                            .reader
                            .surface()
                            .scroll_into_view(last, ScrollBehavior::Smooth)
                            .await
                        {
                            if let Some(failed) = self.tolerate(&mut errors, e) {
                                return failed;
                            }
                            sleep(self.poll_interval).await;
                            continue;
                        }
                    }
                }
                Progress::Unchanged => {}
                Progress::Stalled => {
                    tracing::info!(index = %index, loaded = extent, "Reached end of list");
                    return Resolution::EndOfList;
                }
            }

            errors = 0;
            sleep(self.poll_interval).await;
        }
    }

    /// Each item's index is computed from its section/offset identifier
    async fn resolve_positional(
        &self,
        session: &mut TraversalSession,
        index: GlobalIndex,
    ) -> Resolution {
        let mut tracker = StallTracker::new(self.stall_threshold);
        let mut errors = 0;

        loop {
            let snapshot = match self.reader.snapshot().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    if let Some(failed) = self.tolerate(&mut errors, e) {
                        return failed;
                    }
                    sleep(self.poll_interval).await;
                    continue;
                }
            };

            for (_, position) in snapshot.positioned() {
                session.ledger_mut().observe(position);
            }

            let ledger = session.ledger();
            let mut lowest: Option<GlobalIndex> = None;
            let mut highest: Option<GlobalIndex> = None;

            for (item, position) in snapshot.positioned() {
                let computed = ledger.global_index(position);
                if computed == index {
                    return Resolution::Resolved(ItemHandle {
                        index,
                        element: item.handle.clone(),
                        id: item.id.clone(),
                        position: Some(position),
                    });
                }
                lowest = Some(lowest.map_or(computed, |l| l.min(computed)));
                highest = Some(highest.map_or(computed, |h| h.max(computed)));
            }

            if lowest.is_some_and(|low| index < low) {
                tracing::warn!(index = %index, "Index lies before the live window");
                return Resolution::Evicted;
            }

            let extent = highest.map_or(0, |h| h.value() + 1);
            match tracker.observe(extent) {
                Progress::Grew => {
                    if snapshot.len() > self.window_cap() {
                        let bound = Self::eviction_bound(session, index);
                        let ledger = session.ledger();
                        let limit = snapshot
                            .items()
                            .iter()
                            .take_while(|item| {
                                item.position
                                    .is_some_and(|p| ledger.global_index(p) < bound)
                            })
                            .count();
                        self.evict_ahead(session, limit).await;
                    }
                    if let Some(last) = snapshot.last() {
                        tracing::debug!(index = %index, highest = extent, "Scrolling to load more items");
                        if let Err(e) = self
                            .reader
                            .surface()
                            .scroll_into_view(&last.handle, ScrollBehavior::Smooth)
                            .await
                        {
                            if let Some(failed) = self.tolerate(&mut errors, e) {
                                return failed;
                            }
                            sleep(self.poll_interval).await;
                            continue;
                        }
                    }
                }
                Progress::Unchanged => {}
                Progress::Stalled => {
                    tracing::info!(index = %index, highest = extent, "Reached end of list");
                    return Resolution::EndOfList;
                }
            }

            errors = 0;
            sleep(self.poll_interval).await;
        }
    }

    fn window_cap(&self) -> usize {
        self.eviction
            .as_ref()
            .map_or(usize::MAX, EvictionManager::keep_last)
    }

    /// Items below this index may be evicted while resolving `index`
    fn eviction_bound(session: &TraversalSession, index: GlobalIndex) -> GlobalIndex {
        session.kept_from().map_or(index, |kept| kept.min(index))
    }

    /// Evict at most `limit` items from the front; failures are left to the
    /// next scheduled eviction
    async fn evict_ahead(&self, session: &mut TraversalSession, limit: usize) {
        let Some(eviction) = &self.eviction else {
            return;
        };
        if limit == 0 {
            return;
        }
        if let Err(e) = eviction.evict_prefix(session, limit).await {
            tracing::warn!(error = %e, "Eviction while resolving failed");
        }
    }

    /// Count a surface error; returns the final resolution once the tolerance
    /// is exceeded or the error isn't transient
    fn tolerate(&self, errors: &mut u32, error: ExporterError) -> Option<Resolution> {
        *errors += 1;
        if !error.is_transient() || *errors > self.max_transient_errors {
            tracing::warn!(error = %error, consecutive = *errors, "Giving up on resolution");
            return Some(Resolution::Transient(error));
        }
        tracing::debug!(error = %error, consecutive = *errors, "Transient error while resolving");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stall_tracker() {
        let mut tracker = StallTracker::new(2);
        assert_eq!(tracker.observe(10), Progress::Grew);
        assert_eq!(tracker.observe(10), Progress::Unchanged);
        assert_eq!(tracker.observe(10), Progress::Unchanged);
        assert_eq!(tracker.observe(10), Progress::Stalled);
    }

    #[test]
    fn test_stall_tracker_resets_on_growth() {
        let mut tracker = StallTracker::new(1);
        tracker.observe(5);
        tracker.observe(5);
        assert_eq!(tracker.observe(6), Progress::Grew);
        assert_eq!(tracker.observe(6), Progress::Unchanged);
        // Shrinking is not growth
        assert_eq!(tracker.observe(3), Progress::Stalled);
    }
}
