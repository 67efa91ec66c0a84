//! In-memory automation surface
//!
//! A simulated virtualized gallery used by the test suite and by dry runs.

pub mod gallery;

pub use gallery::{ExportRecord, ExportResponse, FailurePoint, SimulatedGallery};
