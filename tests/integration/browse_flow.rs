use std::sync::Arc;

use streamtree::history::MemoryHistoryStore;
use streamtree::provider::{
    ProviderAdapter, ProviderEntry, ProviderKind, ProviderRegistry, SimulatedCloudProvider,
    StaticProvider,
};
use streamtree::store::{Node, NodeKind};
use streamtree::types::ROOT_ID;
use streamtree::{ExplorerError, Session};

fn all_simulated() -> Session {
    let mut registry = ProviderRegistry::new();
    for kind in [ProviderKind::GoogleDrive, ProviderKind::Dropbox, ProviderKind::OneDrive] {
        registry.register(
            kind,
            ProviderEntry::new(ProviderAdapter::SimulatedCloud(SimulatedCloudProvider::new())),
        );
    }
    registry.register(
        ProviderKind::Local,
        ProviderEntry::new(ProviderAdapter::Static(StaticProvider::sample_library())),
    );
    Session::new(registry, Arc::new(MemoryHistoryStore::default()))
}

#[tokio::test]
async fn mount_then_browse_to_a_video_folder() {
    let session = all_simulated();
    assert!(session.current_children().is_empty());

    let mount = session.mount(ProviderKind::GoogleDrive).await.unwrap();
    assert_eq!(mount.kind, NodeKind::Container);
    assert_eq!(mount.parent_id.as_deref(), Some(ROOT_ID));
    let capacity = mount.capacity.unwrap();
    assert_eq!(capacity.used_label, "45 GB");

    session.enter("gd-root").await.unwrap();
    session.enter("gd-movies").await.unwrap();
    let videos = session.current_children();
    assert_eq!(videos.len(), 3);
    assert!(videos.iter().all(Node::is_video));

    let trail: Vec<String> = session
        .breadcrumbs()
        .unwrap()
        .into_iter()
        .map(|crumb| crumb.name)
        .collect();
    assert_eq!(trail, vec!["Network", "Google Drive (Demo)", "Movies"]);

    assert!(session.go_up());
    assert!(session.go_up());
    assert!(!session.go_up());
    assert_eq!(session.current_id(), ROOT_ID);
}

#[tokio::test]
async fn every_provider_mounts_side_by_side() {
    let session = all_simulated();
    for kind in ProviderKind::ALL {
        session.mount(kind).await.unwrap();
    }
    let roots = session.current_children();
    assert_eq!(roots.len(), 4);
    assert!(roots.iter().all(Node::is_container));
    assert_eq!(session.mounted().len(), 4);
}

#[tokio::test]
async fn containers_list_before_leaves() {
    let session = all_simulated();
    session.mount(ProviderKind::Local).await.unwrap();
    session.enter("local-root").await.unwrap();
    let kinds: Vec<NodeKind> = session.current_children().into_iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Container, NodeKind::Opaque]);
}

#[tokio::test]
async fn entering_a_leaf_is_rejected() {
    let session = all_simulated();
    session.mount(ProviderKind::GoogleDrive).await.unwrap();
    session.enter("gd-root").await.unwrap();
    session.enter("gd-tv").await.unwrap();
    let err = session.enter("tv-1").await.unwrap_err();
    assert_eq!(err, ExplorerError::NotAContainer("tv-1".to_string()));
    assert!(err.is_notice());
    assert_eq!(session.current_id(), "gd-tv");
}

#[tokio::test]
async fn refresh_keeps_the_listing_stable() {
    let session = all_simulated();
    session.mount(ProviderKind::Dropbox).await.unwrap();
    session.enter("db-root").await.unwrap();
    session.enter("db-clips").await.unwrap();
    let before = session.current_children();
    session.refresh().await.unwrap();
    assert_eq!(session.current_children(), before);
}
