//! History persistence backends.

use crate::error::ExplorerError;
use parking_lot::Mutex;
use std::path::Path;

/// Fixed key the history array is stored under
pub const HISTORY_KEY: &str = "cx_history";

/// Durable key-value slot for the serialized history array
pub trait HistoryStore: Send + Sync {
    fn read(&self) -> Result<Option<Vec<u8>>, ExplorerError>;
    fn write(&self, bytes: &[u8]) -> Result<(), ExplorerError>;
}

/// sled-backed history store
pub struct SledHistoryStore {
    db: sled::Db,
}

impl SledHistoryStore {
    pub fn open(path: &Path) -> Result<Self, ExplorerError> {
        std::fs::create_dir_all(path).map_err(|e| {
            ExplorerError::StorageError(format!(
                "Failed to create history directory {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    pub fn flush(&self) -> Result<(), ExplorerError> {
        self.db.flush()?;
        Ok(())
    }
}

impl HistoryStore for SledHistoryStore {
    fn read(&self) -> Result<Option<Vec<u8>>, ExplorerError> {
        Ok(self.db.get(HISTORY_KEY)?.map(|value| value.to_vec()))
    }

    fn write(&self, bytes: &[u8]) -> Result<(), ExplorerError> {
        self.db.insert(HISTORY_KEY, bytes)?;
        // one short-lived CLI invocation may be the only writer
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory history store
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    slot: Mutex<Option<Vec<u8>>>,
}

impl MemoryHistoryStore {
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            slot: Mutex::new(Some(bytes)),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn read(&self) -> Result<Option<Vec<u8>>, ExplorerError> {
        Ok(self.slot.lock().clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), ExplorerError> {
        *self.slot.lock() = Some(bytes.to_vec());
        Ok(())
    }
}
