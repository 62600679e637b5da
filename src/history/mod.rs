//! History Ledger
//!
//! Bounded, deduplicated, most-recent-first log of playback activations. Entries are kept
//! independently of the node store and may outlive the nodes they reference.

pub mod storage;

pub use storage::{HistoryStore, MemoryHistoryStore, SledHistoryStore, HISTORY_KEY};

use crate::error::ExplorerError;
use crate::store::{Node, NodeStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum number of entries retained
pub const HISTORY_CAP: usize = 50;

/// HistoryEntry: one playback activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub file_id: String,
    pub file_name: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Container the node was activated from
    pub file_path: String,
}

/// History ledger
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
    store: Arc<dyn HistoryStore>,
}

impl HistoryLedger {
    /// Empty ledger writing to `store`; nothing is read.
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self {
            entries: Vec::new(),
            store,
        }
    }

    /// Read persisted entries. Missing or unreadable history yields an empty ledger.
    pub fn load(store: Arc<dyn HistoryStore>) -> Self {
        let entries = match Self::read_entries(store.as_ref()) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Discarding persisted history");
                Vec::new()
            }
        };
        debug!(count = entries.len(), "History loaded");
        Self { entries, store }
    }

    fn read_entries(store: &dyn HistoryStore) -> Result<Vec<HistoryEntry>, ExplorerError> {
        let Some(bytes) = store.read()? else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<HistoryEntry> = serde_json::from_slice(&bytes)
            .map_err(|e| ExplorerError::HistoryCorrupt(e.to_string()))?;
        let mut seen = std::collections::HashSet::new();
        entries.retain(|entry| seen.insert(entry.file_id.clone()));
        entries.truncate(HISTORY_CAP);
        Ok(entries)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an activation of `node` from container `origin_id`, stamped now.
    pub fn record(&mut self, node: &Node, origin_id: &str) -> &HistoryEntry {
        self.record_at(node, origin_id, chrono::Utc::now().timestamp_millis())
    }

    /// Record with an explicit timestamp in epoch milliseconds.
    pub fn record_at(&mut self, node: &Node, origin_id: &str, timestamp: i64) -> &HistoryEntry {
        self.entries.retain(|entry| entry.file_id != node.id);
        self.entries.insert(
            0,
            HistoryEntry {
                file_id: node.id.clone(),
                file_name: node.name.clone(),
                timestamp,
                file_path: origin_id.to_string(),
            },
        );
        self.entries.truncate(HISTORY_CAP);
        self.persist();
        &self.entries[0]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Look the entry's node up in the store. `None` is an expected outcome after a restart.
    pub fn resolve(&self, entry: &HistoryEntry, store: &NodeStore) -> Option<Node> {
        store.node(&entry.file_id).cloned()
    }

    /// Best-effort write; failures are logged and otherwise ignored.
    fn persist(&self) {
        let bytes = match serde_json::to_vec(&self.entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to serialize history");
                return;
            }
        };
        if let Err(e) = self.store.write(&bytes) {
            warn!(error = %e, "Failed to persist history");
        }
    }
}
