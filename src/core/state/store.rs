//! Checkpoint storage backends

use super::checkpoint::Checkpoint;
use crate::domain::{ExporterError, Result, RunKind};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Storage for checkpoints, keyed by run kind
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the checkpoint of a run kind, `Ok(None)` if none was saved
    async fn load(&self, kind: RunKind) -> Result<Option<Checkpoint>>;

    /// Create or replace a checkpoint
    async fn save(&self, checkpoint: &Checkpoint) -> Result<()>;

    /// Every stored checkpoint
    async fn load_all(&self) -> Result<Vec<Checkpoint>>;

    /// Remove the checkpoint of a run kind
    async fn clear(&self, kind: RunKind) -> Result<()>;
}

/// JSON file store
///
/// The file holds one object mapping run kinds to checkpoints. Writes go to a
/// sibling temporary file that is then renamed over the original.
pub struct FileCheckpointStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<RunKind, Checkpoint>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                ExporterError::State(format!(
                    "Failed to parse checkpoint file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ExporterError::State(format!(
                "Failed to read checkpoint file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_map(&self, map: &BTreeMap<RunKind, Checkpoint>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            ExporterError::State(format!(
                "Failed to replace checkpoint file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self, kind: RunKind) -> Result<Option<Checkpoint>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(&kind))
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(checkpoint.id, checkpoint.clone());
        self.write_map(&map).await
    }

    async fn load_all(&self) -> Result<Vec<Checkpoint>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.into_values().collect())
    }

    async fn clear(&self, kind: RunKind) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(&kind).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

/// Process-local store, used when checkpointing is disabled and in tests
#[derive(Default)]
pub struct MemoryCheckpointStore {
    inner: Mutex<BTreeMap<RunKind, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load(&self, kind: RunKind) -> Result<Option<Checkpoint>> {
        Ok(self.inner.lock().await.get(&kind).cloned())
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        self.inner
            .lock()
            .await
            .insert(checkpoint.id, checkpoint.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Checkpoint>> {
        Ok(self.inner.lock().await.values().cloned().collect())
    }

    async fn clear(&self, kind: RunKind) -> Result<()> {
        self.inner.lock().await.remove(&kind);
        Ok(())
    }
}
