//! Integration tests for graceful shutdown
//!
//! These tests verify that:
//! - A shutdown signal stops the run between batches
//! - The checkpoint is saved as interrupted with the last confirmed index
//! - An interrupted run resumes right after that index

use gallery_export::adapters::memory::SimulatedGallery;
use gallery_export::config::ExporterConfig;
use gallery_export::core::export::ExportCoordinator;
use gallery_export::core::state::{
    CheckpointBuilder, ExportStatus, MemoryCheckpointStore, StateManager,
};
use gallery_export::domain::{GlobalIndex, RunKind};
use std::sync::Arc;
use tokio::sync::watch;

fn memory_state() -> Arc<StateManager> {
    Arc::new(StateManager::new_with_store(Arc::new(
        MemoryCheckpointStore::new(),
    )))
}

fn config() -> ExporterConfig {
    let mut config = ExporterConfig::default();
    config.export.batch_size = 10;
    config
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_first_batch() {
    let gallery = Arc::new(SimulatedGallery::new(vec![30], 30).unwrap());
    let state = memory_state();
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let coordinator = ExportCoordinator::new(config(), gallery.clone(), state.clone(), rx).unwrap();
    let summary = coordinator.execute_export(None).await.unwrap();

    assert!(summary.interrupted);
    assert!(!summary.end_of_list_reached);
    assert_eq!(summary.batches_attempted, 0);
    assert!(gallery.exports().await.is_empty());

    let checkpoint = state.load_checkpoint(RunKind::Batch).await.unwrap().unwrap();
    assert_eq!(checkpoint.status, ExportStatus::Interrupted);
    assert!(checkpoint.last_run_completed_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_interrupted_run_resumes_after_last_confirmed_index() {
    let state = memory_state();
    let checkpoint = CheckpointBuilder::new(RunKind::Batch, ExporterConfig::default().list.root_url)
        .last_confirmed_index(GlobalIndex::new(9))
        .items_exported(10)
        .status(ExportStatus::Interrupted)
        .build();
    state.save_checkpoint(&checkpoint).await.unwrap();

    let gallery = Arc::new(SimulatedGallery::new(vec![30], 30).unwrap());
    let (_tx, rx) = watch::channel(false);
    let coordinator = ExportCoordinator::new(config(), gallery.clone(), state.clone(), rx).unwrap();
    let summary = coordinator.execute_export(None).await.unwrap();

    assert_eq!(summary.first_index, Some(GlobalIndex::new(10)));
    assert!(summary.end_of_list_reached);
    assert_eq!(summary.items_confirmed, 20);

    let exports = gallery.exports().await;
    assert_eq!(exports.len(), 2);
    assert_eq!(
        exports[0].selected.first(),
        gallery.item_id_at(10).await.as_ref()
    );

    let checkpoint = state.load_checkpoint(RunKind::Batch).await.unwrap().unwrap();
    assert_eq!(checkpoint.status, ExportStatus::Completed);
    assert_eq!(checkpoint.items_exported, 30);
    assert_eq!(checkpoint.last_confirmed_index, Some(GlobalIndex::new(29)));
}
