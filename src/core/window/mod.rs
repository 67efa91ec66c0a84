//! Materialized window
//!
//! - [`snapshot`] - reads the materialized items and their positions
//! - [`eviction`] - bounds the window by removing its oldest items

pub mod eviction;
pub mod snapshot;

pub use eviction::EvictionManager;
pub use snapshot::{SnapshotReader, WindowItem, WindowSnapshot};
