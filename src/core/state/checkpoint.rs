//! Checkpoint model for tracking export progress
//!
//! One checkpoint is kept per run kind. It records the last global index whose
//! export was confirmed so a restarted process resumes right after it.

use crate::domain::{GlobalIndex, RunKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Export status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    /// Export was never started
    #[default]
    NotStarted,
    /// Export is in progress
    InProgress,
    /// The end of the list was reached
    Completed,
    /// Export stopped on an unrecoverable error
    Failed,
    /// Export was stopped by the user
    Interrupted,
}

impl ExportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::NotStarted => "not_started",
            ExportStatus::InProgress => "in_progress",
            ExportStatus::Completed => "completed",
            ExportStatus::Failed => "failed",
            ExportStatus::Interrupted => "interrupted",
        }
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted resume point for one run kind
///
/// # Examples
///
/// ```
/// use gallery_export::core::state::{CheckpointBuilder, ExportStatus};
/// use gallery_export::domain::{GlobalIndex, RunKind};
///
/// let mut checkpoint = CheckpointBuilder::new(RunKind::Batch, "https://example.com/#/gallery").build();
/// assert_eq!(checkpoint.resume_index(GlobalIndex::ZERO), GlobalIndex::ZERO);
///
/// checkpoint.record_confirmed(GlobalIndex::new(39), 40);
/// assert_eq!(checkpoint.resume_index(GlobalIndex::ZERO), GlobalIndex::new(40));
/// assert_eq!(checkpoint.status, ExportStatus::NotStarted);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Run kind this checkpoint tracks
    pub id: RunKind,

    /// Root URL of the list that was exported
    pub list_url: String,

    /// Highest global index whose export was confirmed
    pub last_confirmed_index: Option<GlobalIndex>,

    /// Total items confirmed across runs
    pub items_exported: u64,

    /// Total batches confirmed across runs
    pub batches_confirmed: u64,

    /// Total recoveries performed across runs
    pub recoveries: u64,

    /// Identifier of the last run that touched this checkpoint
    pub last_run_id: Option<Uuid>,

    /// When the last run started
    pub last_run_started_at: DateTime<Utc>,

    /// When the last run ended (None while in progress)
    pub last_run_completed_at: Option<DateTime<Utc>>,

    /// Status of the last run
    pub status: ExportStatus,
}

impl Checkpoint {
    /// Index to resume from: right after the last confirmed index, or `start`
    /// when nothing was confirmed yet
    pub fn resume_index(&self, start: GlobalIndex) -> GlobalIndex {
        self.last_confirmed_index
            .map(GlobalIndex::next)
            .unwrap_or(start)
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == ExportStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == ExportStatus::Completed
    }

    /// Duration of the last run if it ended
    pub fn last_run_duration(&self) -> Option<chrono::Duration> {
        self.last_run_completed_at
            .map(|completed| completed - self.last_run_started_at)
    }

    /// Mark a new run as started
    pub fn mark_started(&mut self, run_id: Uuid) {
        self.last_run_id = Some(run_id);
        self.last_run_started_at = Utc::now();
        self.last_run_completed_at = None;
        self.status = ExportStatus::InProgress;
    }

    /// Mark the list as fully exported
    pub fn mark_completed(&mut self) {
        self.finish(ExportStatus::Completed);
    }

    pub fn mark_failed(&mut self) {
        self.finish(ExportStatus::Failed);
    }

    pub fn mark_interrupted(&mut self) {
        self.finish(ExportStatus::Interrupted);
    }

    fn finish(&mut self, status: ExportStatus) {
        self.last_run_completed_at = Some(Utc::now());
        self.status = status;
    }

    /// Record a confirmed export ending at `last_index`
    ///
    /// The confirmed index never moves backwards.
    pub fn record_confirmed(&mut self, last_index: GlobalIndex, items: u64) {
        if self.last_confirmed_index.map_or(true, |prev| last_index > prev) {
            self.last_confirmed_index = Some(last_index);
        }
        self.items_exported += items;
        self.batches_confirmed += 1;
    }

    pub fn record_recovery(&mut self) {
        self.recoveries += 1;
    }
}

/// Builder for creating Checkpoint instances
pub struct CheckpointBuilder {
    id: RunKind,
    list_url: String,
    last_confirmed_index: Option<GlobalIndex>,
    items_exported: u64,
    status: ExportStatus,
}

impl CheckpointBuilder {
    pub fn new(id: RunKind, list_url: impl Into<String>) -> Self {
        Self {
            id,
            list_url: list_url.into(),
            last_confirmed_index: None,
            items_exported: 0,
            status: ExportStatus::NotStarted,
        }
    }

    pub fn last_confirmed_index(mut self, index: GlobalIndex) -> Self {
        self.last_confirmed_index = Some(index);
        self
    }

    pub fn items_exported(mut self, count: u64) -> Self {
        self.items_exported = count;
        self
    }

    pub fn status(mut self, status: ExportStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Checkpoint {
        Checkpoint {
            id: self.id,
            list_url: self.list_url,
            last_confirmed_index: self.last_confirmed_index,
            items_exported: self.items_exported,
            batches_confirmed: 0,
            recoveries: 0,
            last_run_id: None,
            last_run_started_at: Utc::now(),
            last_run_completed_at: None,
            status: self.status,
        }
    }
}
