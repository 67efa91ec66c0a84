//! Export orchestration
//!
//! This module provides the export logic, including:
//! - Batch selection and export with bounded retries
//! - Export coordination, checkpointing and recovery
//! - Per-item thumbnail saves
//! - The download permission bootstrap
//! - Summary and reporting

pub mod batch;
pub mod bootstrap;
pub mod coordinator;
pub mod recovery;
pub mod summary;
pub mod thumbnail;

pub use batch::{BatchConfig, BatchController, BatchReport, SelectionRange};
pub use bootstrap::{pixel_data_url, DownloadBootstrap, BOOTSTRAP_FILE_NAME};
pub use coordinator::ExportCoordinator;
pub use recovery::ListRecovery;
pub use summary::{ExportError, ExportErrorType, ExportSummary};
pub use thumbnail::{thumbnail_file_name, ThumbnailExporter};
