//! Integration tests for the thumbnail exporter and the download bootstrap

use gallery_export::adapters::memory::{FailurePoint, SimulatedGallery};
use gallery_export::config::ExporterConfig;
use gallery_export::core::export::{
    pixel_data_url, thumbnail_file_name, DownloadBootstrap, ThumbnailExporter, BOOTSTRAP_FILE_NAME,
};
use gallery_export::core::state::{ExportStatus, FileCheckpointStore, StateManager};
use gallery_export::domain::{GlobalIndex, RunKind};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

fn exporter(
    gallery: Arc<SimulatedGallery>,
    state: Arc<StateManager>,
    tweak: impl FnOnce(&mut ExporterConfig),
) -> (ThumbnailExporter, watch::Sender<bool>) {
    let mut config = ExporterConfig::default();
    tweak(&mut config);
    let (tx, rx) = watch::channel(false);
    let exporter = ThumbnailExporter::new(config, gallery, state, rx).unwrap();
    (exporter, tx)
}

fn file_state(dir: &TempDir) -> Arc<StateManager> {
    let store = FileCheckpointStore::new(dir.path().join("state.json"));
    Arc::new(StateManager::new_with_store(Arc::new(store)))
}

#[tokio::test(start_paused = true)]
async fn test_thumbnails_across_sections_with_eviction() {
    let dir = TempDir::new().unwrap();
    let gallery = Arc::new(SimulatedGallery::new(vec![40, 35, 25], 30).unwrap());
    let (exporter, _tx) = exporter(gallery.clone(), file_state(&dir), |c| {
        c.thumbnails.evict_every_items = 25;
        c.traversal.window_cap = 20;
        c.export.batch_size = 20;
    });

    let summary = exporter.execute(None).await.unwrap();

    assert!(summary.end_of_list_reached);
    assert_eq!(summary.files_saved, 100);
    assert_eq!(summary.recoveries, 0);
    assert!(gallery.removed_count().await > 0);

    let saved = gallery.saved_files().await;
    let names: Vec<String> = saved.iter().map(|(name, _)| name.clone()).collect();
    let expected: Vec<String> = (0..100).map(|i| thumbnail_file_name(GlobalIndex::new(i))).collect();
    assert_eq!(names, expected);
    assert_eq!(saved[57].1, SimulatedGallery::thumbnail_url(57));
}

#[tokio::test(start_paused = true)]
async fn test_thumbnails_resume_numbering_from_checkpoint() {
    let dir = TempDir::new().unwrap();

    let gallery = Arc::new(SimulatedGallery::new(vec![12], 20).unwrap());
    let (tx, rx) = watch::channel(false);
    // Interrupted before the first item, then a checkpoint as if #7 was saved
    tx.send(true).unwrap();
    let state = file_state(&dir);
    let first = ThumbnailExporter::new(ExporterConfig::default(), gallery, state.clone(), rx).unwrap();
    let summary = first.execute(Some(GlobalIndex::new(5))).await.unwrap();
    assert!(summary.interrupted);
    assert_eq!(summary.files_saved, 0);

    let mut checkpoint = state.load_checkpoint(RunKind::Thumbnails).await.unwrap().unwrap();
    assert_eq!(checkpoint.status, ExportStatus::Interrupted);
    checkpoint.record_confirmed(GlobalIndex::new(7), 8);
    state.save_checkpoint(&checkpoint).await.unwrap();

    let gallery = Arc::new(SimulatedGallery::new(vec![12], 20).unwrap());
    let (second, _tx) = exporter(gallery.clone(), file_state(&dir), |_| {});
    let summary = second.execute(None).await.unwrap();

    assert_eq!(summary.first_index, Some(GlobalIndex::new(8)));
    let names: Vec<String> = gallery
        .saved_files()
        .await
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["00008", "00009", "00010", "00011"]);
}

#[tokio::test(start_paused = true)]
async fn test_thumbnail_failure_without_recovery_stops_run() {
    let dir = TempDir::new().unwrap();
    let gallery = Arc::new(SimulatedGallery::new(vec![10], 20).unwrap());
    gallery.inject_failure(FailurePoint::ImageSource, 1).await;
    let state = file_state(&dir);
    let (exporter, _tx) = exporter(gallery.clone(), state.clone(), |c| {
        c.recovery.enabled = false;
        c.thumbnails.failure_threshold = 2;
    });

    assert!(exporter.execute(None).await.is_err());
    assert!(gallery.saved_files().await.is_empty());
    assert_eq!(gallery.reload_count().await, 0);

    let checkpoint = state.load_checkpoint(RunKind::Thumbnails).await.unwrap().unwrap();
    assert_eq!(checkpoint.status, ExportStatus::Failed);
}

#[tokio::test]
async fn test_bootstrap_saves_pixel_images() {
    let gallery = Arc::new(SimulatedGallery::new(vec![1], 1).unwrap());
    let bootstrap = DownloadBootstrap::new(gallery.clone());

    assert_eq!(bootstrap.run(3).await.unwrap(), 3);

    let saved = gallery.saved_files().await;
    assert_eq!(saved.len(), 3);
    assert!(saved
        .iter()
        .all(|(name, url)| name == BOOTSTRAP_FILE_NAME && *url == pixel_data_url()));
}

#[tokio::test]
async fn test_bootstrap_stops_at_first_failed_save() {
    let gallery = Arc::new(SimulatedGallery::new(vec![1], 1).unwrap());
    gallery.inject_failure(FailurePoint::SaveFile, 1).await;
    let bootstrap = DownloadBootstrap::new(gallery.clone());

    assert!(bootstrap.run(3).await.is_err());
    assert!(gallery.saved_files().await.is_empty());
}
