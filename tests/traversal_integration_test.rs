//! Integration tests for index resolution and window eviction
//!
//! These tests drive the simulated gallery through the resolver and the
//! eviction manager and verify that:
//! - Global indices keep naming the same item after eviction
//! - Evicting a window within its cap is a no-op
//! - The section ledger maps identifiers onto dense global indices
//! - Positional resolution stays correct when the list leaves holes
//! - The window stays bounded while scrolling toward a far index
//! - The end of the list is detected

use gallery_export::adapters::memory::SimulatedGallery;
use gallery_export::adapters::surface::AutomationSurface;
use gallery_export::config::{ExporterConfig, ResolveStrategy};
use gallery_export::core::cursor::{IndexResolver, ItemHandle, Resolution, TraversalSession};
use gallery_export::core::window::{EvictionManager, SnapshotReader};
use gallery_export::domain::{GlobalIndex, IntrinsicPosition};
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;
use tokio::time::Instant;

const SETTLE: Duration = Duration::from_secs(2);

fn traversal(gallery: Arc<SimulatedGallery>, keep_last: usize) -> (IndexResolver, EvictionManager) {
    let config = ExporterConfig::default();
    let reader = SnapshotReader::new(
        gallery,
        config.list.item_query.clone(),
        config.list.naming().unwrap(),
    );
    (
        IndexResolver::from_config(reader.clone(), &config.traversal),
        EvictionManager::new(reader, keep_last, SETTLE),
    )
}

async fn resolve(
    resolver: &IndexResolver,
    session: &mut TraversalSession,
    index: u64,
) -> ItemHandle {
    match resolver.resolve(session, GlobalIndex::new(index)).await {
        Resolution::Resolved(item) => item,
        other => panic!("expected #{index} to resolve, got {}", other.label()),
    }
}

async fn item_id(gallery: &SimulatedGallery, item: &ItemHandle) -> Option<String> {
    gallery.attribute(&item.element, "id").await.unwrap()
}

#[test_case(ResolveStrategy::Contiguous ; "contiguous")]
#[test_case(ResolveStrategy::Positional ; "positional")]
#[tokio::test(start_paused = true)]
async fn test_resolution_loads_pages_until_index(strategy: ResolveStrategy) {
    let gallery = Arc::new(SimulatedGallery::new(vec![100, 100, 100], 60).unwrap());
    let (resolver, _) = traversal(gallery.clone(), 105);
    let mut session = TraversalSession::new(strategy);

    let item = resolve(&resolver, &mut session, 150).await;

    assert_eq!(item.index, GlobalIndex::new(150));
    assert_eq!(item_id(&gallery, &item).await, gallery.item_id_at(150).await);
    assert!(gallery.materialized_len().await >= 151);
}

#[tokio::test(start_paused = true)]
async fn test_eviction_within_cap_is_noop() {
    let gallery = Arc::new(SimulatedGallery::new(vec![300], 60).unwrap());
    let (_, eviction) = traversal(gallery.clone(), 105);
    let mut session = TraversalSession::new(ResolveStrategy::Contiguous);

    let started = Instant::now();
    let removed = eviction.evict(&mut session, None).await.unwrap();

    assert_eq!(removed, 0);
    assert_eq!(session.eviction_offset(), 0);
    assert_eq!(gallery.removed_count().await, 0);
    // No settle pause without removals
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[test_case(ResolveStrategy::Contiguous ; "contiguous")]
#[test_case(ResolveStrategy::Positional ; "positional")]
#[tokio::test(start_paused = true)]
async fn test_index_names_same_item_after_eviction(strategy: ResolveStrategy) {
    let gallery = Arc::new(SimulatedGallery::new(vec![100, 100, 100], 60).unwrap());
    let (resolver, eviction) = traversal(gallery.clone(), 105);
    let mut session = TraversalSession::new(strategy);

    let before = resolve(&resolver, &mut session, 150).await;
    let before_id = item_id(&gallery, &before).await;
    let window = gallery.materialized_len().await;

    let started = Instant::now();
    let removed = eviction.evict(&mut session, None).await.unwrap();

    assert_eq!(removed, window - 105);
    assert_eq!(session.eviction_offset(), removed as u64);
    assert_eq!(gallery.materialized_len().await, 105);
    assert!(started.elapsed() >= SETTLE);

    let after = resolve(&resolver, &mut session, 150).await;
    assert_eq!(item_id(&gallery, &after).await, before_id);

    let next = resolve(&resolver, &mut session, 151).await;
    assert_eq!(item_id(&gallery, &next).await, gallery.item_id_at(151).await);
}

#[tokio::test(start_paused = true)]
async fn test_evicted_index_is_reported() {
    let gallery = Arc::new(SimulatedGallery::new(vec![300], 60).unwrap());
    let (resolver, eviction) = traversal(gallery.clone(), 20);
    let mut session = TraversalSession::new(ResolveStrategy::Contiguous);

    assert_eq!(eviction.evict(&mut session, None).await.unwrap(), 40);

    let resolution = resolver.resolve(&mut session, GlobalIndex::new(10)).await;
    assert!(matches!(resolution, Resolution::Evicted));
}

#[tokio::test(start_paused = true)]
async fn test_eviction_never_removes_protected_item() {
    let gallery = Arc::new(SimulatedGallery::new(vec![300], 60).unwrap());
    let (resolver, eviction) = traversal(gallery.clone(), 10);
    let mut session = TraversalSession::new(ResolveStrategy::Contiguous);

    let protected = resolve(&resolver, &mut session, 30).await;
    let removed = eviction
        .evict(&mut session, Some(&protected.element))
        .await
        .unwrap();

    assert_eq!(removed, 30);
    let again = resolve(&resolver, &mut session, 30).await;
    assert_eq!(again.element, protected.element);
}

#[tokio::test(start_paused = true)]
async fn test_positional_indices_accumulate_across_sections() {
    let gallery = Arc::new(SimulatedGallery::new(vec![20, 30, 25], 100).unwrap());
    let (resolver, _) = traversal(gallery.clone(), 105);
    let mut session = TraversalSession::new(ResolveStrategy::Positional);

    let first_of_second = resolve(&resolver, &mut session, 20).await;
    assert_eq!(first_of_second.position, Some(IntrinsicPosition::new(2, 1)));

    let first_of_third = resolve(&resolver, &mut session, 50).await;
    assert_eq!(first_of_third.position, Some(IntrinsicPosition::new(3, 1)));

    let last = resolve(&resolver, &mut session, 74).await;
    assert_eq!(last.position, Some(IntrinsicPosition::new(3, 25)));
    assert_eq!(session.ledger().sections(), 3);
}

#[test_case(ResolveStrategy::Contiguous, 31 ; "contiguous shifts past hole")]
#[test_case(ResolveStrategy::Positional, 30 ; "positional reads identifiers")]
#[tokio::test(start_paused = true)]
async fn test_resolution_with_hole_in_window(strategy: ResolveStrategy, resolved_as: usize) {
    let gallery = Arc::new(SimulatedGallery::new(vec![20, 20], 40).unwrap());
    let (resolver, _) = traversal(gallery.clone(), 105);
    let mut session = TraversalSession::new(strategy);
    // The list itself drops #5 from the window without anything being evicted
    gallery.unmount(5).await;

    let item = resolve(&resolver, &mut session, 30).await;

    assert_eq!(item_id(&gallery, &item).await, gallery.item_id_at(resolved_as).await);
    assert_eq!(session.eviction_offset(), 0);
}

#[test_case(ResolveStrategy::Contiguous ; "contiguous")]
#[test_case(ResolveStrategy::Positional ; "positional")]
#[tokio::test(start_paused = true)]
async fn test_far_index_keeps_window_bounded(strategy: ResolveStrategy) {
    let gallery = Arc::new(SimulatedGallery::new(vec![1000], 60).unwrap());
    let (resolver, eviction) = traversal(gallery.clone(), 105);
    let resolver = resolver.with_eviction(eviction);
    let mut session = TraversalSession::new(strategy);

    let item = resolve(&resolver, &mut session, 900).await;

    assert_eq!(item_id(&gallery, &item).await, gallery.item_id_at(900).await);
    assert!(gallery.peak_materialized().await <= 105 + 60);
    assert!(session.eviction_offset() > 0);
    assert!(session.eviction_offset() <= 900);
}

#[tokio::test(start_paused = true)]
async fn test_eviction_while_resolving_spares_kept_items() {
    let gallery = Arc::new(SimulatedGallery::new(vec![1000], 60).unwrap());
    let (resolver, eviction) = traversal(gallery.clone(), 105);
    let resolver = resolver.with_eviction(eviction);
    let mut session = TraversalSession::new(ResolveStrategy::Contiguous);
    session.keep_from(GlobalIndex::new(300));

    resolve(&resolver, &mut session, 600).await;

    assert_eq!(session.eviction_offset(), 300);
    let kept = resolve(&resolver, &mut session, 300).await;
    assert_eq!(item_id(&gallery, &kept).await, gallery.item_id_at(300).await);
}

#[test_case(ResolveStrategy::Contiguous ; "contiguous")]
#[test_case(ResolveStrategy::Positional ; "positional")]
#[tokio::test(start_paused = true)]
async fn test_end_of_list(strategy: ResolveStrategy) {
    let gallery = Arc::new(SimulatedGallery::new(vec![15, 10], 10).unwrap());
    let (resolver, _) = traversal(gallery.clone(), 105);
    let mut session = TraversalSession::new(strategy);

    resolve(&resolver, &mut session, 24).await;
    let resolution = resolver.resolve(&mut session, GlobalIndex::new(25)).await;

    assert!(matches!(resolution, Resolution::EndOfList));
}
