//! Playback handoff
//!
//! Turns "video V activated among siblings S" into a launch descriptor for an external
//! player. Small playlists travel inline as a data locator; oversized ones fall back to
//! launching V alone.

mod launcher;

pub use launcher::{DryRunLauncher, Launcher, ProcessLauncher};

use crate::config::HandoffConfig;
use crate::error::ExplorerError;
use crate::playlist::Playlist;
use crate::store::Node;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default external player application id
pub const DEFAULT_TARGET_APP: &str = "com.mxtech.videoplayer.ad";

/// Inline locators must stay below this many characters
pub const INLINE_LIMIT: usize = 50_000;

/// MIME type of the playlist document
pub const PLAYLIST_MIME: &str = "audio/x-mpegurl";

/// Extra request header the player must send when fetching media
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthHeader {
    pub name: String,
    pub value: String,
}

impl AuthHeader {
    pub fn bearer(token: &str) -> Self {
        Self {
            name: "Authorization".to_string(),
            value: format!("Bearer {}", token),
        }
    }
}

/// Which strategy produced a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStrategy {
    InlinePlaylist,
    SingleItem,
}

/// LaunchDescriptor: everything an external player needs to start playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    pub target_application_id: String,
    pub mime_type: String,
    pub payload_locator: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<AuthHeader>,
    pub strategy: LaunchStrategy,
    /// Number of items reachable from this launch
    pub item_count: usize,
}

/// Encode a playlist document as a self-contained data locator.
pub fn data_locator(document: &str) -> String {
    format!(
        "data:{};base64,{}",
        PLAYLIST_MIME,
        BASE64_STANDARD.encode(document.as_bytes())
    )
}

/// Handoff builder
#[derive(Debug, Clone)]
pub struct HandoffBuilder {
    target_app: String,
    inline_limit: usize,
}

impl Default for HandoffBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_APP, INLINE_LIMIT)
    }
}

impl HandoffBuilder {
    pub fn new(target_app: impl Into<String>, inline_limit: usize) -> Self {
        Self {
            target_app: target_app.into(),
            inline_limit,
        }
    }

    pub fn from_config(config: &HandoffConfig) -> Self {
        Self::new(config.target_app.clone(), config.inline_limit)
    }

    /// Build the descriptor for activating `target_id` among `siblings`.
    pub fn build(
        &self,
        siblings: &[Node],
        target_id: &str,
        auth_token: Option<&str>,
    ) -> Result<LaunchDescriptor, ExplorerError> {
        let playlist = Playlist::from_siblings(siblings, target_id)?;
        // from_siblings already proved the target is one of the videos
        let target = siblings
            .iter()
            .find(|node| node.id == target_id)
            .ok_or_else(|| ExplorerError::TargetNotFound(target_id.to_string()))?;
        let auth_header = auth_token.map(AuthHeader::bearer);

        let locator = data_locator(&playlist.render());
        if locator.len() < self.inline_limit {
            debug!(items = playlist.len(), bytes = locator.len(), "Inline playlist handoff");
            return Ok(LaunchDescriptor {
                target_application_id: self.target_app.clone(),
                mime_type: PLAYLIST_MIME.to_string(),
                payload_locator: locator,
                title: target.name.clone(),
                auth_header,
                strategy: LaunchStrategy::InlinePlaylist,
                item_count: playlist.len(),
            });
        }

        let url = target.stream_url().ok_or(ExplorerError::NoPlayableMedia)?;
        info!(
            items = playlist.len(),
            bytes = locator.len(),
            limit = self.inline_limit,
            "Playlist too large to inline, launching single item"
        );
        Ok(LaunchDescriptor {
            target_application_id: self.target_app.clone(),
            mime_type: target.media_type(),
            payload_locator: url.to_string(),
            title: target.name.clone(),
            auth_header,
            strategy: LaunchStrategy::SingleItem,
            item_count: 1,
        })
    }
}

/// Decode an inline locator back to the playlist document.
pub fn decode_inline(locator: &str) -> Option<String> {
    let payload = locator.strip_prefix(&format!("data:{};base64,", PLAYLIST_MIME))?;
    let bytes = BASE64_STANDARD.decode(payload).ok()?;
    String::from_utf8(bytes).ok()
}
