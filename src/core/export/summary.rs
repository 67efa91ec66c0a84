//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting run results.

use crate::domain::{ExporterError, GlobalIndex};
use std::time::Duration;
use uuid::Uuid;

/// Summary of one export or thumbnail run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Identifier of this run
    pub run_id: Uuid,

    /// Index the run started from
    pub first_index: Option<GlobalIndex>,

    /// Highest index whose export was confirmed during this run
    pub last_confirmed_index: Option<GlobalIndex>,

    /// Batches for which at least one export attempt was made
    pub batches_attempted: usize,

    /// Batches whose export was confirmed
    pub batches_confirmed: usize,

    /// Items selected across all batches, including failed ones
    pub items_selected: usize,

    /// Items covered by confirmed exports
    pub items_confirmed: usize,

    /// Files saved in thumbnail and bootstrap runs
    pub files_saved: usize,

    /// Export attempts beyond the first, plus local thumbnail retries
    pub retries: usize,

    /// Reloads of the list after fatal errors
    pub recoveries: usize,

    /// The list was exhausted
    pub end_of_list_reached: bool,

    /// The user stopped the run
    pub interrupted: bool,

    /// Duration of the run
    pub duration: Duration,

    /// Errors encountered during the run
    pub errors: Vec<ExportError>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            first_index: None,
            last_confirmed_index: None,
            batches_attempted: 0,
            batches_confirmed: 0,
            items_selected: 0,
            items_confirmed: 0,
            files_saved: 0,
            retries: 0,
            recoveries: 0,
            end_of_list_reached: false,
            interrupted: false,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Record a confirmed export ending at `last_index`
    pub fn record_confirmed(&mut self, last_index: GlobalIndex, items: usize) {
        self.batches_confirmed += 1;
        self.items_confirmed += items;
        if self.last_confirmed_index.map_or(true, |prev| last_index > prev) {
            self.last_confirmed_index = Some(last_index);
        }
    }

    /// Check if the run finished without errors or interruption
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty() && !self.interrupted
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            first_index = ?self.first_index.map(GlobalIndex::value),
            last_confirmed_index = ?self.last_confirmed_index.map(GlobalIndex::value),
            batches_attempted = self.batches_attempted,
            batches_confirmed = self.batches_confirmed,
            items_selected = self.items_selected,
            items_confirmed = self.items_confirmed,
            files_saved = self.files_saved,
            retries = self.retries,
            recoveries = self.recoveries,
            end_of_list = self.end_of_list_reached,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            "Run finished"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Run finished with errors");
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = ?error.context,
                    "Run error"
                );
            }
        }
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// The automation surface could not be reached
    Connection,
    /// Selecting items failed
    Selection,
    /// Export attempts were exhausted
    Export,
    /// Reloading the list failed
    Recovery,
    /// Checkpoint could not be saved or loaded
    State,
    /// Configuration error
    Configuration,
    /// Unknown error
    Unknown,
}

impl ExportErrorType {
    /// Best-effort classification of a domain error
    pub fn of(error: &ExporterError) -> Self {
        match error {
            ExporterError::Surface(crate::domain::SurfaceError::ConnectionFailed(_)) => {
                ExportErrorType::Connection
            }
            ExporterError::Surface(_) => ExportErrorType::Selection,
            ExporterError::Fatal(_) | ExporterError::Export(_) => ExportErrorType::Export,
            ExporterError::State(_) | ExporterError::Io(_) | ExporterError::Serialization(_) => {
                ExportErrorType::State
            }
            ExporterError::Configuration(_) | ExporterError::Validation(_) => {
                ExportErrorType::Configuration
            }
            _ => ExportErrorType::Unknown,
        }
    }
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g. the batch range)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

impl From<&ExporterError> for ExportError {
    fn from(error: &ExporterError) -> Self {
        ExportError::new(ExportErrorType::of(error), error.to_string())
    }
}
