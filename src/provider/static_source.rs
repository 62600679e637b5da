//! Static catalog backend: a fixed node table, optionally read from a JSON file.

use super::ProviderKind;
use crate::error::ExplorerError;
use crate::store::{Node, NodeKind};
use crate::types::ROOT_ID;
use std::path::Path;

/// Static provider
#[derive(Debug, Clone)]
pub struct StaticProvider {
    nodes: Vec<Node>,
}

impl StaticProvider {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Built-in sample library used when no catalog file is configured.
    pub fn sample_library() -> Self {
        Self::new(vec![
            Node::container("local-root", ProviderKind::Local.display_name(), ROOT_ID),
            Node::container("local-shorts", "Shorts", "local-root"),
            Node::video(
                "local-joyrides",
                "For Bigger Joyrides.mp4",
                "local-shorts",
                "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerJoyrides.mp4",
            )
            .with_size("2.5MB"),
            Node::video(
                "local-meltdowns",
                "For Bigger Meltdowns.mp4",
                "local-shorts",
                "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerMeltdowns.mp4",
            )
            .with_size("2.9MB"),
            Node::leaf("local-readme", "README.txt", NodeKind::Opaque, "local-root"),
        ])
    }

    /// Load a catalog: a JSON array of nodes whose top-level entries hang off `root`.
    pub fn from_catalog_file(path: &Path) -> Result<Self, ExplorerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExplorerError::ConfigError(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let nodes: Vec<Node> = serde_json::from_str(&content).map_err(|e| {
            ExplorerError::ConfigError(format!("Failed to parse catalog {}: {}", path.display(), e))
        })?;
        Ok(Self::new(nodes))
    }

    pub fn list_children(&self, node_id: &str) -> Result<Vec<Node>, ExplorerError> {
        Ok(self
            .nodes
            .iter()
            .filter(|node| node.parent_id.as_deref() == Some(node_id))
            .cloned()
            .collect())
    }

    pub fn mount(&self, kind: ProviderKind) -> Result<Vec<Node>, ExplorerError> {
        if !self
            .nodes
            .iter()
            .any(|node| node.parent_id.as_deref() == Some(ROOT_ID))
        {
            return Err(ExplorerError::MountUnsupported(kind.to_string()));
        }
        Ok(self.nodes.clone())
    }
}
