//! Provider Adapter
//!
//! Tagged-variant adapter over the storage backends a mount can be served by. Every variant
//! answers "list children of node X" and "mount a new subtree under root".

pub mod clients;
pub mod registry;
pub mod remote;
pub mod simulated;
pub mod static_source;

pub use clients::{DriveHttpClient, ListingClient, StorageQuota};
pub use registry::{ProviderEntry, ProviderRegistry};
pub use remote::{classify, RawEntry, RemoteListingProvider, FOLDER_CONTENT_TYPE};
pub use simulated::SimulatedCloudProvider;
pub use static_source::StaticProvider;

use crate::error::ExplorerError;
use crate::store::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mountable provider kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "gdrive")]
    GoogleDrive,
    #[serde(rename = "dropbox")]
    Dropbox,
    #[serde(rename = "onedrive")]
    OneDrive,
    #[serde(rename = "local")]
    Local,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::GoogleDrive,
        ProviderKind::Dropbox,
        ProviderKind::OneDrive,
        ProviderKind::Local,
    ];

    pub fn parse(slug: &str) -> Result<ProviderKind, ExplorerError> {
        match slug {
            "gdrive" => Ok(ProviderKind::GoogleDrive),
            "dropbox" => Ok(ProviderKind::Dropbox),
            "onedrive" => Ok(ProviderKind::OneDrive),
            "local" => Ok(ProviderKind::Local),
            _ => Err(ExplorerError::ConfigError(format!(
                "Invalid provider kind: {}. Must be gdrive, dropbox, onedrive, or local",
                slug
            ))),
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ProviderKind::GoogleDrive => "gdrive",
            ProviderKind::Dropbox => "dropbox",
            ProviderKind::OneDrive => "onedrive",
            ProviderKind::Local => "local",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::GoogleDrive => "Google Drive",
            ProviderKind::Dropbox => "Dropbox",
            ProviderKind::OneDrive => "OneDrive",
            ProviderKind::Local => "Local Media",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Backend variant serving a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Static,
    Simulated,
    Remote,
}

/// Provider adapter, dispatched by variant
pub enum ProviderAdapter {
    Static(StaticProvider),
    SimulatedCloud(SimulatedCloudProvider),
    RemoteListing(RemoteListingProvider),
}

impl ProviderAdapter {
    pub fn backend(&self) -> BackendKind {
        match self {
            ProviderAdapter::Static(_) => BackendKind::Static,
            ProviderAdapter::SimulatedCloud(_) => BackendKind::Simulated,
            ProviderAdapter::RemoteListing(_) => BackendKind::Remote,
        }
    }

    /// List the children of `node_id`.
    ///
    /// No timeout is applied here; callers that need one wrap the future.
    pub async fn list_children(&self, node_id: &str) -> Result<Vec<Node>, ExplorerError> {
        match self {
            ProviderAdapter::Static(provider) => provider.list_children(node_id),
            ProviderAdapter::SimulatedCloud(provider) => provider.list_children(node_id).await,
            ProviderAdapter::RemoteListing(provider) => provider.list_children(node_id).await,
        }
    }

    /// Produce the subtree to graft under root for `kind`.
    pub async fn mount(&self, kind: ProviderKind) -> Result<Vec<Node>, ExplorerError> {
        match self {
            ProviderAdapter::Static(provider) => provider.mount(kind),
            ProviderAdapter::SimulatedCloud(provider) => provider.mount(kind).await,
            ProviderAdapter::RemoteListing(provider) => provider.mount(kind).await,
        }
    }
}

impl fmt::Debug for ProviderAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProviderAdapter").field(&self.backend()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_slugs_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::parse(kind.slug()).unwrap(), kind);
        }
        assert!(ProviderKind::parse("smb").is_err());
    }
}
