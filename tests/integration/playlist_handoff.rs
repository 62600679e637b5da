use std::sync::Arc;

use streamtree::handoff::{decode_inline, HandoffBuilder, LaunchStrategy, PLAYLIST_MIME};
use streamtree::history::MemoryHistoryStore;
use streamtree::playlist::{rotate_to_front, Playlist};
use streamtree::provider::{
    ProviderAdapter, ProviderEntry, ProviderKind, ProviderRegistry, SimulatedCloudProvider,
};
use streamtree::store::Node;
use streamtree::{ExplorerError, Session};

fn videos(n: usize) -> Vec<Node> {
    (0..n)
        .map(|i| {
            Node::video(
                format!("v{i}"),
                format!("Episode {i}.mp4"),
                "season",
                format!("https://cdn.example.com/e{i}.mp4"),
            )
        })
        .collect()
}

#[test]
fn playlist_document_starts_at_the_target() {
    let siblings = videos(3);
    let document = Playlist::from_siblings(&siblings, "v1").unwrap().render();
    assert_eq!(
        document,
        "#EXTM3U\n\
         #EXTINF:-1, Episode 1.mp4\nhttps://cdn.example.com/e1.mp4\n\
         #EXTINF:-1, Episode 2.mp4\nhttps://cdn.example.com/e2.mp4\n\
         #EXTINF:-1, Episode 0.mp4\nhttps://cdn.example.com/e0.mp4\n"
    );
}

#[test]
fn rotation_is_cyclic() {
    let siblings = videos(4);
    let order: Vec<&str> = rotate_to_front(&siblings, "v3")
        .unwrap()
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(order, vec!["v3", "v0", "v1", "v2"]);
}

#[test]
fn oversized_playlist_falls_back_to_single_item() {
    let siblings = videos(1000);
    let descriptor = HandoffBuilder::default().build(&siblings, "v7", Some("tok")).unwrap();
    assert_eq!(descriptor.strategy, LaunchStrategy::SingleItem);
    assert_eq!(descriptor.payload_locator, "https://cdn.example.com/e7.mp4");
    assert_eq!(descriptor.item_count, 1);
    assert_eq!(descriptor.auth_header.unwrap().value, "Bearer tok");
}

#[test]
fn inline_playlist_round_trips_through_the_locator() {
    let siblings = videos(2);
    let descriptor = HandoffBuilder::default().build(&siblings, "v0", None).unwrap();
    assert_eq!(descriptor.mime_type, PLAYLIST_MIME);
    assert!(descriptor.payload_locator.starts_with("data:audio/x-mpegurl;base64,"));
    let document = decode_inline(&descriptor.payload_locator).unwrap();
    assert_eq!(document.lines().filter(|l| l.starts_with("#EXTINF")).count(), 2);
}

#[tokio::test]
async fn activating_a_folder_is_not_playable() {
    let registry = ProviderRegistry::new().with(
        ProviderKind::GoogleDrive,
        ProviderEntry::new(ProviderAdapter::SimulatedCloud(SimulatedCloudProvider::new())),
    );
    let session = Session::new(registry, Arc::new(MemoryHistoryStore::default()));
    session.mount(ProviderKind::GoogleDrive).await.unwrap();
    session.enter("gd-root").await.unwrap();
    let err = session.activate("gd-movies").unwrap_err();
    assert_eq!(err, ExplorerError::TargetNotFound("gd-movies".to_string()));
    assert!(session.history().is_empty());
}
