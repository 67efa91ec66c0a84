//! Domain models and types for the exporter.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`GlobalIndex`], [`RunKind`])
//! - **Intrinsic positions** decoded from item identifiers ([`IntrinsicPosition`], [`ItemNaming`])
//! - **Export outcomes** ([`ExportOutcome`], [`OutcomeMarkers`])
//! - **Error types** ([`ExporterError`], [`SurfaceError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! A [`GlobalIndex`] is stable for the whole run. It is translated into a
//! position inside the live window only through
//! [`GlobalIndex::local_position`], which accounts for evicted items:
//!
//! ```rust
//! use gallery_export::domain::GlobalIndex;
//!
//! let index = GlobalIndex::new(130);
//! assert_eq!(index.local_position(105), Some(25));
//! ```

pub mod errors;
pub mod ids;
pub mod outcome;
pub mod position;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ExporterError, SurfaceError};
pub use ids::{GlobalIndex, RunKind};
pub use outcome::{ExportOutcome, OutcomeMarkers};
pub use position::{IntrinsicPosition, ItemNaming};
pub use result::Result;
