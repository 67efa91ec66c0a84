//! Export coordinator - main orchestrator for batch exports
//!
//! Drives the batch controller over consecutive ranges, checkpoints every
//! confirmed batch, bounds the window on a fixed cadence and recovers from
//! fatal errors by reloading the list and resuming after the last confirmed
//! index.

use crate::adapters::surface::AutomationSurface;
use crate::config::ExporterConfig;
use crate::core::cursor::{IndexResolver, TraversalSession};
use crate::core::export::batch::{BatchConfig, BatchController, BatchReport, SelectionRange};
use crate::core::export::recovery::ListRecovery;
use crate::core::export::summary::{ExportError, ExportErrorType, ExportSummary};
use crate::core::state::{Checkpoint, StateManager};
use crate::core::window::{EvictionManager, SnapshotReader};
use crate::domain::{ExporterError, GlobalIndex, Result, RunKind};
use crate::{log_batch_start, log_error_with_context, log_export_complete};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Why the driving loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    EndOfList,
    MaxBatches,
    Interrupted,
}

/// Export coordinator
pub struct ExportCoordinator {
    config: ExporterConfig,
    surface: Arc<dyn AutomationSurface>,
    state_manager: Arc<StateManager>,
    controller: BatchController,
    eviction: EvictionManager,
    recovery: ListRecovery,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the item naming convention is invalid.
    pub fn new(
        config: ExporterConfig,
        surface: Arc<dyn AutomationSurface>,
        state_manager: Arc<StateManager>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        let reader = SnapshotReader::new(
            surface.clone(),
            config.list.item_query.clone(),
            config.list.naming()?,
        );
        let eviction = EvictionManager::from_config(reader.clone(), &config.traversal);
        let controller = BatchController::new(
            IndexResolver::from_config(reader, &config.traversal).with_eviction(eviction.clone()),
            BatchConfig::from_config(&config.export, &config.list),
        );
        let recovery = ListRecovery::from_config(surface.clone(), eviction.clone(), &config)
            .with_shutdown(shutdown_signal.clone());

        Ok(Self {
            config,
            surface,
            state_manager,
            controller,
            eviction,
            recovery,
            shutdown_signal,
        })
    }

    /// Index the run starts at
    ///
    /// An explicit start index wins, then the checkpoint when resuming is
    /// enabled, then `export.start_index`.
    pub fn resume_index(&self, checkpoint: &Checkpoint, explicit: Option<GlobalIndex>) -> GlobalIndex {
        let configured = GlobalIndex::new(self.config.export.start_index);
        match explicit {
            Some(index) => index,
            None if self.config.export.resume => checkpoint.resume_index(configured),
            None => configured,
        }
    }

    /// Execute the export
    ///
    /// This is the main entry point for the export process. It:
    /// 1. Loads the checkpoint and picks the resume index
    /// 2. Runs batches of `export.batch_size` consecutive indices
    /// 3. Checkpoints each confirmed batch
    /// 4. Evicts the window every `traversal.eviction_every_batches` batches
    /// 5. Recovers from fatal batch errors, retrying failed reloads
    ///
    /// The loop ends at the end of the list, after `export.max_batches`
    /// batches, or when the shutdown signal is raised.
    ///
    /// # Errors
    ///
    /// Returns an error when recovery is disabled, when the consecutive
    /// recovery bound is exceeded, or when the checkpoint cannot be saved.
    pub async fn execute_export(&self, start_index: Option<GlobalIndex>) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new();

        let mut checkpoint = self
            .state_manager
            .load_or_create(RunKind::Batch, &self.config.list.root_url)
            .await?;
        let first_index = self.resume_index(&checkpoint, start_index);
        summary.first_index = Some(first_index);

        tracing::info!(
            run_id = %summary.run_id,
            first_index = %first_index,
            batch_size = self.config.export.batch_size,
            strategy = ?self.config.traversal.strategy,
            surface = %self.surface.describe(),
            "Starting export"
        );

        checkpoint.mark_started(summary.run_id);
        self.state_manager.save_checkpoint(&checkpoint).await?;

        let outcome = self
            .drive(&mut checkpoint, &mut summary, first_index)
            .await;

        match &outcome {
            Ok(Stop::EndOfList) => {
                summary.end_of_list_reached = true;
                checkpoint.mark_completed();
            }
            Ok(Stop::MaxBatches) => {
                tracing::info!(
                    max_batches = ?self.config.export.max_batches,
                    "Batch limit reached"
                );
                checkpoint.mark_interrupted();
            }
            Ok(Stop::Interrupted) => {
                tracing::warn!("Export interrupted by user");
                summary.interrupted = true;
                checkpoint.mark_interrupted();
            }
            Err(e) => {
                log_error_with_context!(e, "Export stopped");
                checkpoint.mark_failed();
            }
        }
        self.state_manager.save_checkpoint(&checkpoint).await?;
        outcome?;

        let summary = summary.with_duration(start_time.elapsed());
        log_export_complete!(summary.items_confirmed, summary.duration);
        Ok(summary)
    }

    async fn drive(
        &self,
        checkpoint: &mut Checkpoint,
        summary: &mut ExportSummary,
        first_index: GlobalIndex,
    ) -> Result<Stop> {
        let batch_size = self.config.export.batch_size;
        let eviction_every = self.config.traversal.eviction_every_batches.max(1);

        let mut session = TraversalSession::new(self.config.traversal.strategy);
        let mut next = first_index;
        let mut batches = 0usize;
        let mut consecutive_recoveries = 0u32;

        loop {
            if *self.shutdown_signal.borrow() {
                return Ok(Stop::Interrupted);
            }
            if self
                .config
                .export
                .max_batches
                .is_some_and(|max| batches >= max)
            {
                return Ok(Stop::MaxBatches);
            }

            let range = SelectionRange::new(next, batch_size);
            log_batch_start!(batches + 1, next, batch_size);

            match self.controller.run(&mut session, range).await {
                Ok(report) => {
                    consecutive_recoveries = 0;
                    batches += 1;
                    self.record_batch(checkpoint, summary, &report).await?;

                    if report.truncated {
                        return Ok(Stop::EndOfList);
                    }
                    next = range.end();

                    if batches % eviction_every == 0 {
                        if let Err(e) = self.eviction.evict_before(&mut session, next).await {
                            tracing::warn!(error = %e, "Eviction failed, continuing");
                        }
                    }
                }
                Err(e) => {
                    log_error_with_context!(e, format!("Batch {range} failed"));
                    summary.add_error(ExportError::from(&e).with_context(format!("batch={range}")));

                    if !self.config.recovery.enabled {
                        return Err(e);
                    }

                    let resume = summary
                        .last_confirmed_index
                        .map(GlobalIndex::next)
                        .unwrap_or(first_index);
                    match self
                        .recovery
                        .recover(&mut session, resume, &mut consecutive_recoveries)
                        .await
                    {
                        Ok(()) => {}
                        Err(ExporterError::Interrupted(_)) => return Ok(Stop::Interrupted),
                        Err(recovery_error) => {
                            summary.add_error(
                                ExportError::new(
                                    ExportErrorType::Recovery,
                                    recovery_error.to_string(),
                                )
                                .with_context(format!("batch={range}")),
                            );
                            return Err(recovery_error);
                        }
                    }

                    summary.recoveries += 1;
                    checkpoint.record_recovery();
                    self.state_manager.save_checkpoint(checkpoint).await?;

                    next = resume;
                    tracing::info!(resume_index = %next, "Resuming after recovery");
                }
            }
        }
    }

    async fn record_batch(
        &self,
        checkpoint: &mut Checkpoint,
        summary: &mut ExportSummary,
        report: &BatchReport,
    ) -> Result<()> {
        summary.items_selected += report.selected;
        if report.attempts > 0 {
            summary.batches_attempted += 1;
            summary.retries += report.attempts as usize - 1;
        }

        if !report.is_confirmed() {
            return Ok(());
        }

        if let Some(last) = report.last_selected() {
            summary.record_confirmed(last, report.selected);
            checkpoint.record_confirmed(last, report.selected as u64);
            self.state_manager.checkpoint_batch(checkpoint).await?;
        }
        Ok(())
    }
}
