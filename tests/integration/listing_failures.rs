use std::sync::Arc;

use async_trait::async_trait;
use streamtree::history::MemoryHistoryStore;
use streamtree::provider::{
    ListingClient, ProviderAdapter, ProviderEntry, ProviderKind, ProviderRegistry, RawEntry,
    RemoteListingProvider, FOLDER_CONTENT_TYPE,
};
use streamtree::{ExplorerError, Session};

/// Serves an empty root, a one-folder tree, or fails for the listed parents.
struct ScriptedClient {
    failing: Vec<String>,
}

#[async_trait]
impl ListingClient for ScriptedClient {
    async fn list_page(&self, parent_id: &str, _page_size: u32) -> Result<Vec<RawEntry>, String> {
        if self.failing.iter().any(|id| id == parent_id) {
            return Err("503 Service Unavailable".to_string());
        }
        if parent_id != "root" {
            return Ok(Vec::new());
        }
        Ok(vec![RawEntry {
            id: "folder-a".to_string(),
            name: "Folder A".to_string(),
            content_type_tag: FOLDER_CONTENT_TYPE.to_string(),
            byte_size: None,
            created_timestamp: None,
            download_url: None,
            thumbnail_url: None,
        }])
    }
}

fn session_with(failing: &[&str]) -> Session {
    let client = ScriptedClient {
        failing: failing.iter().map(|s| s.to_string()).collect(),
    };
    let registry = ProviderRegistry::new().with(
        ProviderKind::GoogleDrive,
        ProviderEntry::new(ProviderAdapter::RemoteListing(RemoteListingProvider::new(
            Arc::new(client),
            50,
        ))),
    );
    Session::new(registry, Arc::new(MemoryHistoryStore::default()))
}

#[tokio::test]
async fn empty_container_lists_nothing() {
    let session = session_with(&[]);
    session.mount(ProviderKind::GoogleDrive).await.unwrap();
    session.enter("real-drive-root").await.unwrap();
    session.enter("folder-a").await.unwrap();
    assert!(session.current_children().is_empty());
}

#[tokio::test]
async fn failed_listing_leaves_the_store_untouched() {
    let session = session_with(&["folder-a"]);
    let mount = session.mount(ProviderKind::GoogleDrive).await.unwrap();
    session.enter(&mount.id).await.unwrap();

    let err = session.enter("folder-a").await.unwrap_err();
    match &err {
        ExplorerError::ListingFailed { parent_id, reason } => {
            assert_eq!(parent_id, "folder-a");
            assert!(reason.contains("503"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_notice());
    assert_eq!(session.current_id(), "real-drive-root");
    assert_eq!(session.current_children().len(), 1);
}

#[tokio::test]
async fn failed_first_listing_keeps_cursor_at_root() {
    let session = session_with(&["root"]);
    session.mount(ProviderKind::GoogleDrive).await.unwrap();
    assert!(session.enter("real-drive-root").await.is_err());
    assert_eq!(session.current_id(), streamtree::types::ROOT_ID);
    assert!(session.node("real-drive-root").is_some());
}
