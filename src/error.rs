//! Error types for the virtual media tree and playback handoff.

use thiserror::Error;

/// Errors raised by the store, providers, navigator, handoff and history layers.
///
/// The type is `Clone` so one coalesced listing outcome can be handed to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExplorerError {
    #[error("Listing failed for {parent_id}: {reason}")]
    ListingFailed { parent_id: String, reason: String },

    #[error("Not a container: {0}")]
    NotAContainer(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Playback target {0} is not among the current videos")]
    TargetNotFound(String),

    #[error("No playable media in the current folder")]
    NoPlayableMedia,

    #[error("Player unavailable: {0}")]
    LaunchUnavailable(String),

    #[error("History corrupt: {0}")]
    HistoryCorrupt(String),

    #[error("Store integrity violation: {0}")]
    StoreIntegrity(String),

    #[error("Mount already in progress for {0}")]
    MountInProgress(String),

    #[error("Provider {0} cannot be mounted")]
    MountUnsupported(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl ExplorerError {
    pub fn listing_failed(parent_id: &str, reason: impl std::fmt::Display) -> Self {
        ExplorerError::ListingFailed {
            parent_id: parent_id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that are shown to the user as a transient notice and leave state unchanged.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            ExplorerError::ListingFailed { .. }
                | ExplorerError::NotAContainer(_)
                | ExplorerError::TargetNotFound(_)
                | ExplorerError::NoPlayableMedia
                | ExplorerError::LaunchUnavailable(_)
                | ExplorerError::MountInProgress(_)
                | ExplorerError::MountUnsupported(_)
                | ExplorerError::NodeNotFound(_)
        )
    }
}

impl From<sled::Error> for ExplorerError {
    fn from(err: sled::Error) -> Self {
        ExplorerError::StorageError(err.to_string())
    }
}

impl From<config::ConfigError> for ExplorerError {
    fn from(err: config::ConfigError) -> Self {
        ExplorerError::ConfigError(err.to_string())
    }
}
