//! Batch export controller
//!
//! One batch selects a contiguous range of global indices, issues a single
//! export command for the selection and interprets the confirmation message.
//! The batch moves through three phases:
//!
//! 1. **Selecting**: every index is resolved, hovered and selected through its
//!    select control. Reaching the end of the list truncates the batch. An
//!    item that goes stale mid-selection is re-resolved and selected again.
//! 2. **Exporting**: once any earlier status message has faded, the export
//!    control is clicked and the new status message is read and classified.
//! 3. **Retrying**: an export that was not confirmed is re-issued after a
//!    linear backoff, up to a bounded number of attempts.

use crate::adapters::surface::{AutomationSurface, ElementHandle, ScrollBehavior};
use crate::config::{ExportConfig, ListConfig};
use crate::core::cursor::{IndexResolver, ItemHandle, Resolution, TraversalSession};
use crate::core::wait::{wait_for, wait_until};
use crate::domain::{
    ExportOutcome, ExporterError, GlobalIndex, OutcomeMarkers, Result, SurfaceError,
};
use crate::log_retry_attempt;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for batch processing
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Export attempts per batch
    pub max_attempts: u32,
    /// Linear backoff base
    pub backoff_base: Duration,
    /// Maximum wait for the status message to appear
    pub confirmation_timeout: Duration,
    /// Wait for the status message to disappear after reading it
    pub wait_for_fade: bool,
    /// Maximum wait for the status message to disappear
    pub fade_timeout: Duration,
    /// Maximum wait for a control to become clickable
    pub control_timeout: Duration,
    /// Delay between probes
    pub wait_poll: Duration,
    /// Classification markers
    pub markers: OutcomeMarkers,
    /// Identifier of the export control
    pub export_control_id: String,
    /// Identifier of the status message
    pub status_message_id: String,
}

impl BatchConfig {
    /// Create from the `[export]` and `[list]` sections
    pub fn from_config(export: &ExportConfig, list: &ListConfig) -> Self {
        Self {
            max_attempts: export.max_attempts,
            backoff_base: Duration::from_secs(export.retry_backoff_base_secs),
            confirmation_timeout: export.confirmation_timeout(),
            wait_for_fade: export.wait_for_fade,
            fade_timeout: export.fade_timeout(),
            control_timeout: export.control_timeout(),
            wait_poll: export.wait_poll(),
            markers: export.markers(),
            export_control_id: list.export_control_id.clone(),
            status_message_id: list.status_message_id.clone(),
        }
    }

    /// Backoff before the retry that follows attempt `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

/// Contiguous range of global indices `[start, start + len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: GlobalIndex,
    pub len: usize,
}

impl SelectionRange {
    pub fn new(start: GlobalIndex, len: usize) -> Self {
        Self { start, len }
    }

    /// First index after the range
    pub fn end(&self) -> GlobalIndex {
        self.start.advance(self.len as u64)
    }

    /// Indices of the range in order
    pub fn indices(&self) -> impl Iterator<Item = GlobalIndex> {
        let start = self.start.value();
        (start..start + self.len as u64).map(GlobalIndex::new)
    }
}

impl fmt::Display for SelectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

/// Result of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Requested range
    pub range: SelectionRange,
    /// Number of items selected, from the start of the range
    pub selected: usize,
    /// The list ended before the range was fully selected
    pub truncated: bool,
    /// Outcome of the last export attempt, `None` when nothing was selected
    pub outcome: Option<ExportOutcome>,
    /// Export attempts made
    pub attempts: u32,
    /// Backoff waited between attempts
    pub backoff_delays: Vec<Duration>,
}

impl BatchReport {
    pub fn is_confirmed(&self) -> bool {
        self.outcome.as_ref().is_some_and(ExportOutcome::is_confirmed)
    }

    /// Last index covered by the selection
    pub fn last_selected(&self) -> Option<GlobalIndex> {
        (self.selected > 0).then(|| self.range.start.advance(self.selected as u64 - 1))
    }
}

#[derive(Debug)]
struct Selection {
    selected: usize,
    truncated: bool,
}

/// Drives selection and export of one batch at a time
#[derive(Clone)]
pub struct BatchController {
    resolver: IndexResolver,
    config: BatchConfig,
}

impl BatchController {
    pub fn new(resolver: IndexResolver, config: BatchConfig) -> Self {
        Self { resolver, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn surface(&self) -> &Arc<dyn AutomationSurface> {
        self.resolver.reader().surface()
    }

    /// Select `range` and export the selection
    ///
    /// # Errors
    ///
    /// Selection failures are returned as they occur. An index that was
    /// already evicted and an export that is never confirmed within the
    /// attempt budget both yield [`ExporterError::Fatal`].
    pub async fn run(
        &self,
        session: &mut TraversalSession,
        range: SelectionRange,
    ) -> Result<BatchReport> {
        let selection = self.select_range(session, range).await?;

        if selection.selected == 0 {
            tracing::info!(range = %range, "Nothing left to select, skipping export");
            return Ok(BatchReport {
                range,
                selected: 0,
                truncated: selection.truncated,
                outcome: None,
                attempts: 0,
                backoff_delays: Vec::new(),
            });
        }

        let (outcome, attempts, backoff_delays) = self.export_with_retry(range).await?;

        Ok(BatchReport {
            range,
            selected: selection.selected,
            truncated: selection.truncated,
            outcome: Some(outcome),
            attempts,
            backoff_delays,
        })
    }

    async fn select_range(
        &self,
        session: &mut TraversalSession,
        range: SelectionRange,
    ) -> Result<Selection> {
        session.keep_from(range.start);

        for (selected, index) in range.indices().enumerate() {
            let mut errors = 0;
            loop {
                let item = match self.resolver.resolve(session, index).await {
                    Resolution::Resolved(item) => item,
                    Resolution::EndOfList => {
                        tracing::info!(
                            range = %range,
                            selected = selected,
                            "List ended, batch truncated"
                        );
                        return Ok(Selection {
                            selected,
                            truncated: true,
                        });
                    }
                    Resolution::Evicted => {
                        return Err(ExporterError::Fatal(format!(
                            "{index} was evicted before it could be selected"
                        )));
                    }
                    Resolution::Transient(e) => return Err(e),
                };

                match self.select(&item).await {
                    Ok(()) => break,
                    Err(e) if e.is_transient() && errors < self.resolver.max_transient_errors() => {
                        errors += 1;
                        tracing::warn!(
                            index = %index,
                            attempt = errors,
                            error = %e,
                            "Item changed while selecting, resolving again"
                        );
                        sleep(self.resolver.poll_interval() * errors).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(Selection {
            selected: range.len,
            truncated: false,
        })
    }

    async fn select(&self, item: &ItemHandle) -> Result<()> {
        let surface = self.surface();
        surface
            .scroll_into_view(&item.element, ScrollBehavior::IfNeeded)
            .await?;
        surface.hover(&item.element).await?;

        let id = match &item.id {
            Some(id) => id.clone(),
            None => surface
                .attribute(&item.element, "id")
                .await?
                .ok_or_else(|| {
                    ExporterError::Export(format!("Item {} has no identifier", item.index))
                })?,
        };

        let control_id = self
            .resolver
            .reader()
            .naming()
            .select_control_id(&id)
            .ok_or_else(|| {
                ExporterError::Export(format!("Cannot derive select control from '{id}'"))
            })?;

        let control_id = control_id.as_str();
        let control = wait_until(
            "select control clickable",
            self.config.control_timeout,
            self.config.wait_poll,
            move || self.clickable(control_id),
        )
        .await?;
        surface.click(&control).await?;

        tracing::debug!(index = %item.index, id = %id, "Selected item");
        Ok(())
    }

    async fn export_with_retry(
        &self,
        range: SelectionRange,
    ) -> Result<(ExportOutcome, u32, Vec<Duration>)> {
        let max_attempts = self.config.max_attempts;
        let mut delays = Vec::new();
        let mut last_failure = String::new();

        for attempt in 1..=max_attempts {
            match self.export_once().await {
                Ok(outcome) if outcome.is_confirmed() => {
                    tracing::info!(
                        range = %range,
                        attempt = attempt,
                        outcome = %outcome,
                        "Export confirmed"
                    );
                    return Ok((outcome, attempt, delays));
                }
                Ok(outcome) => {
                    tracing::warn!(range = %range, attempt = attempt, outcome = %outcome, "Export not confirmed");
                    last_failure = outcome.to_string();
                }
                Err(e) => {
                    tracing::warn!(range = %range, attempt = attempt, error = %e, "Export attempt failed");
                    last_failure = e.to_string();
                }
            }

            if attempt < max_attempts {
                let delay = self.config.backoff_for(attempt);
                log_retry_attempt!(attempt + 1, max_attempts, last_failure);
                sleep(delay).await;
                delays.push(delay);
            }
        }

        Err(ExporterError::Fatal(format!(
            "Export of {range} not confirmed after {max_attempts} attempts: {last_failure}"
        )))
    }

    /// Issue one export command and classify its status message
    ///
    /// A message left over from an earlier export is waited out first so it
    /// cannot be read as this export's outcome. A missing status message
    /// yields [`ExportOutcome::TimedOut`]. A message that does not fade in
    /// time is logged and otherwise ignored.
    pub async fn export_once(&self) -> Result<ExportOutcome> {
        if let Err(e) = wait_for(
            "previous status message to fade",
            self.config.fade_timeout,
            self.config.wait_poll,
            move || self.status_gone(),
        )
        .await
        {
            tracing::warn!(error = %e, "Previous status message still visible");
        }

        let export_id = self.config.export_control_id.as_str();
        let control = wait_until(
            "export control clickable",
            self.config.control_timeout,
            self.config.wait_poll,
            move || self.clickable(export_id),
        )
        .await?;
        self.surface().click(&control).await?;

        let text = match wait_until(
            "status message",
            self.config.confirmation_timeout,
            self.config.wait_poll,
            move || self.status_text(),
        )
        .await
        {
            Ok(text) => text,
            Err(ExporterError::Surface(SurfaceError::Timeout(_))) => {
                return Ok(ExportOutcome::TimedOut)
            }
            Err(e) => return Err(e),
        };

        if self.config.wait_for_fade {
            if let Err(e) = wait_for(
                "status message to fade",
                self.config.fade_timeout,
                self.config.wait_poll,
                move || self.status_gone(),
            )
            .await
            {
                tracing::warn!(error = %e, "Status message still visible");
            }
        }

        Ok(self.config.markers.classify(text.trim()))
    }

    async fn clickable(&self, id: &str) -> Result<Option<ElementHandle>> {
        let surface = self.surface();
        let Some(element) = surface.find_by_id(id).await? else {
            return Ok(None);
        };
        let ready = surface.is_displayed(&element).await? && surface.is_enabled(&element).await?;
        Ok(ready.then_some(element))
    }

    async fn status_text(&self) -> Result<Option<String>> {
        let surface = self.surface();
        let Some(element) = surface.find_by_id(&self.config.status_message_id).await? else {
            return Ok(None);
        };
        let text = surface.text(&element).await?;
        Ok(surface.is_displayed(&element).await?.then_some(text))
    }

    async fn status_gone(&self) -> Result<bool> {
        let surface = self.surface();
        match surface.find_by_id(&self.config.status_message_id).await? {
            Some(element) => Ok(!surface.is_displayed(&element).await?),
            None => Ok(true),
        }
    }
}
