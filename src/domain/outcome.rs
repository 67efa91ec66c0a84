//! Export outcomes
//!
//! Each export command is answered by a transient status message. Its text is
//! classified into an [`ExportOutcome`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interpretation of the confirmation signal for one export attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "message")]
pub enum ExportOutcome {
    /// The surface confirmed the export
    Confirmed(String),
    /// The surface explicitly declined the export
    Rejected(String),
    /// A status message appeared but matched neither marker
    Unknown(String),
    /// No status message appeared within the confirmation timeout
    TimedOut,
}

impl ExportOutcome {
    /// Whether the export went through
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ExportOutcome::Confirmed(_))
    }

    /// Short label used in logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            ExportOutcome::Confirmed(_) => "confirmed",
            ExportOutcome::Rejected(_) => "rejected",
            ExportOutcome::Unknown(_) => "unknown",
            ExportOutcome::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportOutcome::Confirmed(msg)
            | ExportOutcome::Rejected(msg)
            | ExportOutcome::Unknown(msg) => write!(f, "{} ({msg:?})", self.label()),
            ExportOutcome::TimedOut => f.write_str(self.label()),
        }
    }
}

/// Markers used to classify status message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeMarkers {
    /// Text that appears when the export succeeded
    pub success: String,
    /// Text that appears when the export was declined
    pub failure: String,
}

impl OutcomeMarkers {
    /// Creates a marker pair
    pub fn new(success: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            success: success.into(),
            failure: failure.into(),
        }
    }

    /// Classifies a status message
    ///
    /// The failure marker is checked first: failure messages such as
    /// "1 item could not be downloaded" also contain the success marker.
    ///
    /// # Examples
    ///
    /// ```
    /// use gallery_export::domain::outcome::{ExportOutcome, OutcomeMarkers};
    ///
    /// let markers = OutcomeMarkers::new("downloaded", "not be downloaded");
    /// assert!(markers.classify("40 items downloaded").is_confirmed());
    /// assert!(matches!(
    ///     markers.classify("2 items could not be downloaded"),
    ///     ExportOutcome::Rejected(_)
    /// ));
    /// ```
    pub fn classify(&self, text: &str) -> ExportOutcome {
        let owned = text.to_string();
        if !self.failure.is_empty() && text.contains(&self.failure) {
            ExportOutcome::Rejected(owned)
        } else if !self.success.is_empty() && text.contains(&self.success) {
            ExportOutcome::Confirmed(owned)
        } else {
            ExportOutcome::Unknown(owned)
        }
    }
}
