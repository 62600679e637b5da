//! Remote listing backend: maps raw backend entries into tree nodes.

use super::clients::{ListingClient, StorageQuota};
use super::ProviderKind;
use crate::error::ExplorerError;
use crate::store::{Capacity, Node, NodeKind};
use crate::types::ROOT_ID;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Backend content-type tag that denotes a folder
pub const FOLDER_CONTENT_TYPE: &str = "application/vnd.google-apps.folder";

/// Id of the virtual mount point for a remote drive
pub const REMOTE_MOUNT_ID: &str = "real-drive-root";

/// Mount point id for a remote drive of `kind`. Google Drive keeps the bare id.
pub fn remote_mount_id(kind: ProviderKind) -> String {
    match kind {
        ProviderKind::GoogleDrive => REMOTE_MOUNT_ID.to_string(),
        other => format!("{}-{}", other.slug(), REMOTE_MOUNT_ID),
    }
}

/// Alias the backend uses for the account root
const BACKEND_ROOT_ALIAS: &str = "root";

/// Hard cap on entries per listing request
pub const MAX_PAGE_SIZE: u32 = 100;

/// RawEntry: one row of a remote listing response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub id: String,
    pub name: String,
    pub content_type_tag: String,
    pub byte_size: Option<u64>,
    pub created_timestamp: Option<DateTime<Utc>>,
    pub download_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Classify a backend content-type tag. Total: anything unrecognised is `Opaque`.
pub fn classify(content_type_tag: &str) -> NodeKind {
    if content_type_tag == FOLDER_CONTENT_TYPE {
        NodeKind::Container
    } else if content_type_tag.starts_with("video/") {
        NodeKind::Video
    } else if content_type_tag.starts_with("image/") {
        NodeKind::Image
    } else {
        NodeKind::Opaque
    }
}

fn megabytes_label(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
}

fn gigabytes_label(bytes: u64) -> String {
    format!("{:.1} GB", bytes as f64 / 1024.0 / 1024.0 / 1024.0)
}

/// Map a raw entry into a node owned by `parent_id`.
pub fn map_entry(raw: RawEntry, parent_id: &str) -> Node {
    let kind = classify(&raw.content_type_tag);
    let mut node = Node::leaf(raw.id, raw.name, kind, parent_id);
    node.size_label = raw.byte_size.map(megabytes_label);
    node.date_label = raw
        .created_timestamp
        .map(|ts| ts.format("%Y-%m-%d").to_string());
    node.source_url = raw.download_url;
    if let Some(url) = raw.thumbnail_url {
        node = node.with_thumbnail(url);
    }
    if kind != NodeKind::Container && !raw.content_type_tag.is_empty() {
        node.content_type = Some(raw.content_type_tag);
    }
    node
}

fn capacity_from_quota(quota: Option<StorageQuota>) -> Capacity {
    match quota {
        Some(StorageQuota {
            usage,
            limit: Some(limit),
        }) if limit > 0 => Capacity::new(
            gigabytes_label(usage),
            gigabytes_label(limit),
            usage as f64 / limit as f64,
        ),
        Some(StorageQuota { usage, limit: _ }) => {
            Capacity::new(gigabytes_label(usage), "Unlimited", 0.0)
        }
        None => Capacity::new("Unknown", "Unknown", 0.5),
    }
}

/// Remote listing provider
pub struct RemoteListingProvider {
    client: Arc<dyn ListingClient>,
    page_size: u32,
    mount_id: String,
}

impl RemoteListingProvider {
    pub fn new(client: Arc<dyn ListingClient>, page_size: u32) -> Self {
        Self {
            client,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            mount_id: REMOTE_MOUNT_ID.to_string(),
        }
    }

    /// Use the mount point id reserved for `kind`.
    pub fn for_kind(mut self, kind: ProviderKind) -> Self {
        self.mount_id = remote_mount_id(kind);
        self
    }

    pub fn mount_id(&self) -> &str {
        &self.mount_id
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub async fn list_children(&self, node_id: &str) -> Result<Vec<Node>, ExplorerError> {
        let query_id = if node_id == self.mount_id {
            BACKEND_ROOT_ALIAS
        } else {
            node_id
        };
        let entries = self
            .client
            .list_page(query_id, self.page_size)
            .await
            .map_err(|reason| ExplorerError::listing_failed(node_id, reason))?;
        debug!(parent = node_id, count = entries.len(), "Remote listing received");
        Ok(entries
            .into_iter()
            .map(|raw| map_entry(raw, node_id))
            .collect())
    }

    /// The remote mount point is a single virtual container; its children are listed lazily.
    pub async fn mount(&self, kind: ProviderKind) -> Result<Vec<Node>, ExplorerError> {
        let quota = match self.client.storage_quota().await {
            Ok(quota) => quota,
            Err(e) => {
                warn!(provider = %kind, error = %e, "Storage quota unavailable");
                None
            }
        };
        let mount = Node::container(self.mount_id.clone(), kind.display_name(), ROOT_ID)
            .with_capacity(capacity_from_quota(quota));
        Ok(vec![mount])
    }
}
