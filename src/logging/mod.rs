//! Logging and observability
//!
//! Structured logging through `tracing`, with:
//! - Configurable log levels
//! - Local JSON file logging with rotation
//! - Helper macros for the events every run emits
//!
//! # Example
//!
//! ```no_run
//! use gallery_export::logging::init_logging;
//! use gallery_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a batch
///
/// # Example
///
/// ```no_run
/// use gallery_export::log_batch_start;
/// use gallery_export::domain::GlobalIndex;
///
/// log_batch_start!(3, GlobalIndex::new(120), 40);
/// ```
#[macro_export]
macro_rules! log_batch_start {
    ($batch:expr, $first_index:expr, $size:expr) => {
        tracing::info!(
            batch = $batch,
            first_index = %$first_index,
            size = $size,
            "Starting batch"
        );
    };
}

/// Log the completion of a run
///
/// # Example
///
/// ```no_run
/// use gallery_export::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(400, Duration::from_secs(600));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            count = $count,
            duration_ms = $duration.as_millis(),
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use gallery_export::log_error_with_context;
/// use gallery_export::domain::ExporterError;
///
/// let error = ExporterError::Fatal("retries exhausted".to_string());
/// log_error_with_context!(&error, "Batch failed");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use gallery_export::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "unknown confirmation");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
