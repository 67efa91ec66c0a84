//! Window eviction
//!
//! Bounds the materialized window by removing its oldest items. Removed items
//! are counted into the session's eviction offset so global indices keep
//! mapping to the same items.

use crate::adapters::surface::ElementHandle;
use crate::config::TraversalConfig;
use crate::core::cursor::TraversalSession;
use crate::core::window::SnapshotReader;
use crate::domain::{GlobalIndex, Result};
use std::time::Duration;
use tokio::time::sleep;

/// Removes items from the front of the window
#[derive(Clone)]
pub struct EvictionManager {
    reader: SnapshotReader,
    keep_last: usize,
    settle: Duration,
}

impl EvictionManager {
    pub fn new(reader: SnapshotReader, keep_last: usize, settle: Duration) -> Self {
        Self {
            reader,
            keep_last,
            settle,
        }
    }

    pub fn from_config(reader: SnapshotReader, config: &TraversalConfig) -> Self {
        Self::new(reader, config.window_cap, config.eviction_settle())
    }

    /// Configured window cap
    pub fn keep_last(&self) -> usize {
        self.keep_last
    }

    /// Evict down to the configured window cap
    pub async fn evict(
        &self,
        session: &mut TraversalSession,
        protect: Option<&ElementHandle>,
    ) -> Result<usize> {
        self.evict_to(session, self.keep_last, protect).await
    }

    /// Evict down to the configured window cap, keeping `next` and every
    /// item after it materialized
    pub async fn evict_before(
        &self,
        session: &mut TraversalSession,
        next: GlobalIndex,
    ) -> Result<usize> {
        let limit = next.value().saturating_sub(session.eviction_offset());
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        self.evict_prefix(session, limit).await
    }

    /// Evict down to the configured window cap, removing at most the first
    /// `limit` items of the window
    pub async fn evict_prefix(&self, session: &mut TraversalSession, limit: usize) -> Result<usize> {
        self.remove_prefix(session, self.keep_last, None, limit).await
    }

    /// Remove all but the last `keep_last` items
    ///
    /// Only a prefix of the window is removed, and never the protected item or
    /// anything after it. Returns the number of items removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be read or an item cannot be
    /// removed. Items removed before the failure are still counted.
    pub async fn evict_to(
        &self,
        session: &mut TraversalSession,
        keep_last: usize,
        protect: Option<&ElementHandle>,
    ) -> Result<usize> {
        self.remove_prefix(session, keep_last, protect, usize::MAX)
            .await
    }

    async fn remove_prefix(
        &self,
        session: &mut TraversalSession,
        keep_last: usize,
        protect: Option<&ElementHandle>,
        limit: usize,
    ) -> Result<usize> {
        let handles = self.reader.handles().await?;
        if handles.len() <= keep_last {
            tracing::debug!(
                window = handles.len(),
                keep_last = keep_last,
                "Window within cap, nothing to evict"
            );
            return Ok(0);
        }

        let mut count = (handles.len() - keep_last).min(limit);
        if let Some(protected) = protect {
            if let Some(at) = handles.iter().position(|h| h == protected) {
                count = count.min(at);
            }
        }

        let mut removed = 0;
        for handle in &handles[..count] {
            if let Err(e) = self.reader.surface().remove(handle).await {
                session.record_eviction(removed);
                tracing::warn!(removed = removed, error = %e, "Eviction interrupted");
                return Err(e);
            }
            removed += 1;
        }
        session.record_eviction(removed);

        tracing::info!(
            removed = removed,
            eviction_offset = session.eviction_offset(),
            "Evicted items from window"
        );

        if removed > 0 {
            sleep(self.settle).await;
        }

        Ok(removed)
    }
}
