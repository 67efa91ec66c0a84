//! Thumbnail exporter
//!
//! Saves the thumbnail image of every item, one item at a time. Each file is
//! named after the zero-padded global index of its item, so a resumed run
//! continues the same numbering.

use crate::adapters::surface::{AutomationSurface, ElementHandle, ScrollBehavior};
use crate::config::ExporterConfig;
use crate::core::cursor::{IndexResolver, ItemHandle, Resolution, TraversalSession};
use crate::core::export::recovery::ListRecovery;
use crate::core::export::summary::{ExportError, ExportErrorType, ExportSummary};
use crate::core::state::{Checkpoint, StateManager};
use crate::core::wait::wait_until;
use crate::core::window::{EvictionManager, SnapshotReader};
use crate::domain::{ExporterError, GlobalIndex, Result, RunKind};
use crate::{log_error_with_context, log_export_complete};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::time::sleep;

/// File name of the thumbnail at `index`
pub fn thumbnail_file_name(index: GlobalIndex) -> String {
    format!("{:05}", index.value())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    EndOfList,
    Interrupted,
}

/// Per-item thumbnail exporter
pub struct ThumbnailExporter {
    config: ExporterConfig,
    surface: Arc<dyn AutomationSurface>,
    state_manager: Arc<StateManager>,
    resolver: IndexResolver,
    eviction: EvictionManager,
    recovery: ListRecovery,
    shutdown_signal: watch::Receiver<bool>,
}

impl ThumbnailExporter {
    /// Create a new thumbnail exporter
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
        let resolver =
            IndexResolver::from_config(reader, &config.traversal).with_eviction(eviction.clone());
        let recovery = ListRecovery::from_config(surface.clone(), eviction.clone(), &config)
            .with_shutdown(shutdown_signal.clone());

        Ok(Self {
            config,
            surface,
            state_manager,
            resolver,
            eviction,
            recovery,
            shutdown_signal,
        })
    }

    /// Save thumbnails from the resume index until the end of the list
    ///
    /// # Errors
    ///
    /// Returns an error when recovery is disabled, when the consecutive
    /// recovery bound is exceeded, or when the checkpoint cannot be saved.
    pub async fn execute(&self, start_index: Option<GlobalIndex>) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new();

        let mut checkpoint = self
            .state_manager
            .load_or_create(RunKind::Thumbnails, &self.config.list.root_url)
            .await?;
        let configured = GlobalIndex::new(self.config.export.start_index);
        let first_index = match start_index {
            Some(index) => index,
            None if self.config.export.resume => checkpoint.resume_index(configured),
            None => configured,
        };
        summary.first_index = Some(first_index);

        tracing::info!(
            run_id = %summary.run_id,
            first_index = %first_index,
            surface = %self.surface.describe(),
            "Starting thumbnail export"
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
            Ok(Stop::Interrupted) => {
                tracing::warn!("Thumbnail export interrupted by user");
                summary.interrupted = true;
                checkpoint.mark_interrupted();
            }
            Err(e) => {
                log_error_with_context!(e, "Thumbnail export stopped");
                checkpoint.mark_failed();
            }
        }
        self.state_manager.save_checkpoint(&checkpoint).await?;
        outcome?;

        let summary = summary.with_duration(start_time.elapsed());
        log_export_complete!(summary.files_saved, summary.duration);
        Ok(summary)
    }

    async fn drive(
        &self,
        checkpoint: &mut Checkpoint,
        summary: &mut ExportSummary,
        first_index: GlobalIndex,
    ) -> Result<Stop> {
        let settings = &self.config.thumbnails;
        let mut session = TraversalSession::new(self.config.traversal.strategy);
        let mut next = first_index;
        let mut failures = 0u32;
        let mut consecutive_recoveries = 0u32;

        loop {
            if *self.shutdown_signal.borrow() {
                return Ok(Stop::Interrupted);
            }

            let error = match self.resolver.resolve(&mut session, next).await {
                Resolution::Resolved(item) => match self.save(&item).await {
                    Ok(()) => {
                        failures = 0;
                        consecutive_recoveries = 0;
                        summary.files_saved += 1;
                        summary.items_confirmed += 1;
                        summary.last_confirmed_index = Some(next);
                        checkpoint.record_confirmed(next, 1);
                        self.state_manager.save_checkpoint(checkpoint).await?;

                        if summary.files_saved as u64 % settings.evict_every_items.max(1) == 0 {
                            if let Err(e) =
                                self.eviction.evict(&mut session, Some(&item.element)).await
                            {
                                tracing::warn!(error = %e, "Eviction failed, continuing");
                            }
                        }
                        next = next.next();
                        continue;
                    }
                    Err(e) => e,
                },
                Resolution::EndOfList => return Ok(Stop::EndOfList),
                Resolution::Evicted => {
                    // Cannot be fixed by waiting
                    failures = settings.failure_threshold;
                    ExporterError::Fatal(format!("{next} was evicted"))
                }
                Resolution::Transient(e) => e,
            };

            failures += 1;
            tracing::warn!(
                index = %next,
                failures = failures,
                threshold = settings.failure_threshold,
                error = %error,
                "Thumbnail failed"
            );

            if failures <= settings.failure_threshold {
                summary.retries += 1;
                sleep(settings.retry_delay()).await;
                continue;
            }

            summary.add_error(ExportError::from(&error).with_context(format!("index={next}")));
            if !self.config.recovery.enabled {
                return Err(error);
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
                        ExportError::new(ExportErrorType::Recovery, recovery_error.to_string())
                            .with_context(format!("index={next}")),
                    );
                    return Err(recovery_error);
                }
            }
            summary.recoveries += 1;
            checkpoint.record_recovery();
            self.state_manager.save_checkpoint(checkpoint).await?;

            failures = 0;
            next = resume;
            tracing::info!(resume_index = %next, "Resuming after recovery");
        }
    }

    async fn save(&self, item: &ItemHandle) -> Result<()> {
        self.surface
            .scroll_into_view(&item.element, ScrollBehavior::IfNeeded)
            .await?;

        let element = &item.element;
        let source = wait_until(
            "thumbnail source",
            self.config.thumbnails.image_timeout(),
            self.config.export.wait_poll(),
            move || self.thumbnail_source(element),
        )
        .await?;

        let file_name = thumbnail_file_name(item.index);
        self.surface.trigger_file_save(&file_name, &source).await?;
        tracing::debug!(index = %item.index, file_name = %file_name, "Saved thumbnail");
        Ok(())
    }

    async fn thumbnail_source(&self, item: &ElementHandle) -> Result<Option<String>> {
        let images = self
            .surface
            .find_within(item, &self.config.list.thumbnail_query)
            .await?;
        let Some(image) = images.first() else {
            return Ok(None);
        };
        Ok(self
            .surface
            .attribute(image, "src")
            .await?
            .filter(|src| !src.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FailurePoint, SimulatedGallery};
    use crate::core::state::{ExportStatus, MemoryCheckpointStore};

    fn exporter(
        gallery: Arc<SimulatedGallery>,
        tweak: impl FnOnce(&mut ExporterConfig),
    ) -> (ThumbnailExporter, Arc<StateManager>, watch::Sender<bool>) {
        let mut config = ExporterConfig::default();
        tweak(&mut config);
        let state = Arc::new(StateManager::new_with_store(Arc::new(
            MemoryCheckpointStore::new(),
        )));
        let (tx, rx) = watch::channel(false);
        let exporter = ThumbnailExporter::new(config, gallery, state.clone(), rx).unwrap();
        (exporter, state, tx)
    }

    #[test]
    fn test_thumbnail_file_name() {
        assert_eq!(thumbnail_file_name(GlobalIndex::new(7)), "00007");
        assert_eq!(thumbnail_file_name(GlobalIndex::new(123456)), "123456");
    }

    #[tokio::test(start_paused = true)]
    async fn test_saves_every_thumbnail_in_order() {
        let gallery = Arc::new(SimulatedGallery::new(vec![15, 10], 10).unwrap());
        let (exporter, state, _tx) = exporter(gallery.clone(), |_| {});

        let summary = exporter.execute(None).await.unwrap();

        assert!(summary.end_of_list_reached);
        assert_eq!(summary.files_saved, 25);

        let saved = gallery.saved_files().await;
        assert_eq!(saved.len(), 25);
        assert_eq!(saved[0], ("00000".to_string(), SimulatedGallery::thumbnail_url(0)));
        assert_eq!(saved[24].0, "00024");

        let checkpoint = state
            .load_checkpoint(RunKind::Thumbnails)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(checkpoint.status, ExportStatus::Completed);
        assert_eq!(checkpoint.last_confirmed_index, Some(GlobalIndex::new(24)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicts_on_cadence() {
        let gallery = Arc::new(SimulatedGallery::new(vec![60], 60).unwrap());
        let (exporter, _state, _tx) = exporter(gallery.clone(), |c| {
            c.thumbnails.evict_every_items = 20;
            c.traversal.window_cap = 10;
            c.export.batch_size = 10;
        });

        let summary = exporter.execute(None).await.unwrap();

        assert_eq!(summary.files_saved, 60);
        assert_eq!(summary.recoveries, 0);
        // The last saved item and everything after it stay materialized
        assert_eq!(gallery.removed_count().await, 19 + 20 + 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_save_failures_are_retried_locally() {
        let gallery = Arc::new(SimulatedGallery::new(vec![5], 10).unwrap());
        gallery.inject_failure(FailurePoint::SaveFile, 2).await;
        let (exporter, _state, _tx) = exporter(gallery.clone(), |_| {});

        let summary = exporter.execute(None).await.unwrap();

        assert_eq!(summary.files_saved, 5);
        assert_eq!(summary.retries, 2);
        assert_eq!(summary.recoveries, 0);
        assert_eq!(gallery.saved_files().await[0].0, "00000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_failures_trigger_recovery_then_give_up() {
        let gallery = Arc::new(SimulatedGallery::new(vec![5], 10).unwrap());
        gallery.inject_failure(FailurePoint::ImageSource, 1).await;
        let (exporter, state, _tx) = exporter(gallery.clone(), |c| {
            c.thumbnails.failure_threshold = 1;
            c.recovery.max_consecutive = Some(1);
        });

        let err = exporter.execute(None).await.unwrap_err();

        assert!(matches!(err, ExporterError::Fatal(_)));
        assert_eq!(gallery.reload_count().await, 1);
        let checkpoint = state
            .load_checkpoint(RunKind::Thumbnails)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(checkpoint.status, ExportStatus::Failed);
        assert_eq!(checkpoint.recoveries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_before_first_item() {
        let gallery = Arc::new(SimulatedGallery::new(vec![5], 10).unwrap());
        let (exporter, _state, tx) = exporter(gallery.clone(), |_| {});
        tx.send(true).unwrap();

        let summary = exporter.execute(None).await.unwrap();
        assert!(summary.interrupted);
        assert!(gallery.saved_files().await.is_empty());
    }
}
