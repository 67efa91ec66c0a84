// Checkpoint tracking and persistence

pub mod checkpoint;
pub mod manager;
pub mod store;

pub use checkpoint::{Checkpoint, CheckpointBuilder, ExportStatus};
pub use manager::StateManager;
pub use store::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
