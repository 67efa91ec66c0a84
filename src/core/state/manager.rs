//! State manager for checkpoint persistence
//!
//! This module provides the StateManager for loading and saving checkpoints
//! through a [`CheckpointStore`].

use crate::config::StateConfig;
use crate::core::state::checkpoint::{Checkpoint, CheckpointBuilder};
use crate::core::state::store::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
use crate::domain::{Result, RunKind};
use std::sync::Arc;

/// State manager for checkpoint persistence
///
/// Checkpoints track the last confirmed global index per run kind so an
/// interrupted export resumes right after it.
pub struct StateManager {
    store: Arc<dyn CheckpointStore>,
}

impl StateManager {
    /// Create a new StateManager on top of a checkpoint store
    pub fn new_with_store(store: Arc<dyn CheckpointStore>) -> Self {
        Self { store }
    }

    /// Build the manager described by the `[state]` section
    ///
    /// With checkpointing disabled progress is only kept in memory.
    pub fn from_config(config: &StateConfig) -> Self {
        if config.enable_checkpointing {
            Self::new_with_store(Arc::new(FileCheckpointStore::new(&config.checkpoint_path)))
        } else {
            Self::new_with_store(Arc::new(MemoryCheckpointStore::new()))
        }
    }

    /// Load a checkpoint
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(Checkpoint))` if found, `Ok(None)` if not found, or an error.
    pub async fn load_checkpoint(&self, kind: RunKind) -> Result<Option<Checkpoint>> {
        self.store.load(kind).await
    }

    /// Load a checkpoint, or create a fresh one for `list_url`
    pub async fn load_or_create(&self, kind: RunKind, list_url: &str) -> Result<Checkpoint> {
        Ok(self
            .store
            .load(kind)
            .await?
            .unwrap_or_else(|| CheckpointBuilder::new(kind, list_url).build()))
    }

    /// Save a checkpoint, replacing any previous one of the same run kind
    pub async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<()> {
        self.store.save(checkpoint).await
    }

    /// Get all stored checkpoints
    pub async fn get_all_checkpoints(&self) -> Result<Vec<Checkpoint>> {
        self.store.load_all().await
    }

    /// Forget the progress of a run kind
    pub async fn clear_checkpoint(&self, kind: RunKind) -> Result<()> {
        tracing::info!(run_kind = %kind, "Clearing checkpoint");
        self.store.clear(kind).await
    }

    /// Checkpoint a confirmed batch
    ///
    /// This is `save_checkpoint` with explicit checkpoint semantics, called
    /// after every confirmed export.
    pub async fn checkpoint_batch(&self, checkpoint: &Checkpoint) -> Result<()> {
        tracing::info!(
            run_kind = %checkpoint.id,
            last_confirmed_index = ?checkpoint.last_confirmed_index.map(|i| i.value()),
            items_exported = checkpoint.items_exported,
            "Checkpointing batch"
        );

        self.save_checkpoint(checkpoint).await
    }
}
