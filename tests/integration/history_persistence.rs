use std::sync::Arc;

use streamtree::history::{HistoryLedger, HistoryStore, SledHistoryStore, HISTORY_CAP};
use streamtree::provider::{
    ProviderAdapter, ProviderEntry, ProviderKind, ProviderRegistry, StaticProvider,
};
use streamtree::store::Node;
use streamtree::Session;
use tempfile::TempDir;

fn local_registry() -> ProviderRegistry {
    ProviderRegistry::new().with(
        ProviderKind::Local,
        ProviderEntry::new(ProviderAdapter::Static(StaticProvider::sample_library())),
    )
}

#[test]
fn ledger_is_capped_and_deduplicated() {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<dyn HistoryStore> = Arc::new(SledHistoryStore::open(temp_dir.path()).unwrap());
    let mut ledger = HistoryLedger::new(store.clone());
    for i in 0..(HISTORY_CAP + 10) {
        let node = Node::video(format!("v{i}"), format!("{i}.mp4"), "dir", "https://x/v.mp4");
        ledger.record_at(&node, "dir", i as i64);
    }
    let again = Node::video("v20", "20.mp4", "dir", "https://x/v.mp4");
    ledger.record_at(&again, "dir", 10_000);

    let reloaded = HistoryLedger::load(store);
    assert_eq!(reloaded.len(), HISTORY_CAP);
    assert_eq!(reloaded.entries()[0].file_id, "v20");
    assert_eq!(
        reloaded.entries().iter().filter(|e| e.file_id == "v20").count(),
        1
    );
}

#[tokio::test]
async fn history_survives_a_new_session_but_resolves_only_once_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history");

    {
        let store = Arc::new(SledHistoryStore::open(&path).unwrap());
        let session = Session::new(local_registry(), store.clone());
        session.mount(ProviderKind::Local).await.unwrap();
        session.enter("local-root").await.unwrap();
        session.enter("local-shorts").await.unwrap();
        session.activate("local-joyrides").unwrap();
        store.flush().unwrap();
    }

    let store = Arc::new(SledHistoryStore::open(&path).unwrap());
    let session = Session::new(local_registry(), store);
    let entry = session.history()[0].clone();
    assert_eq!(entry.file_name, "For Bigger Joyrides.mp4");
    assert_eq!(entry.file_path, "local-shorts");
    assert!(session.resolve_history(&entry).is_none());

    session.mount(ProviderKind::Local).await.unwrap();
    session.enter("local-root").await.unwrap();
    session.enter("local-shorts").await.unwrap();
    assert_eq!(session.resolve_history(&entry).unwrap().id, "local-joyrides");
}
