//! Remote listing clients.

pub mod drive;

pub use drive::DriveHttpClient;

use crate::provider::remote::RawEntry;
use async_trait::async_trait;

/// Storage quota reported by a remote backend, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageQuota {
    pub usage: u64,
    pub limit: Option<u64>,
}

/// Single-page remote listing query
#[async_trait]
pub trait ListingClient: Send + Sync {
    /// List up to `page_size` entries whose parent is `parent_id`, in backend order.
    async fn list_page(&self, parent_id: &str, page_size: u32) -> Result<Vec<RawEntry>, String>;

    /// Storage usage of the account, when the backend reports one.
    async fn storage_quota(&self) -> Result<Option<StorageQuota>, String> {
        Ok(None)
    }
}
