//! Tree node records and derived breadcrumb entries.

use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Container,
    Video,
    Image,
    Opaque,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Container => "folder",
            NodeKind::Video => "video",
            NodeKind::Image => "image",
            NodeKind::Opaque => "file",
        }
    }
}

/// Storage usage of a mount point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    pub used_label: String,
    pub total_label: String,
    /// Fraction in [0, 1]
    pub used_fraction: f64,
}

impl Capacity {
    pub fn new(used_label: impl Into<String>, total_label: impl Into<String>, used_fraction: f64) -> Self {
        Self {
            used_label: used_label.into(),
            total_label: total_label.into(),
            used_fraction: used_fraction.clamp(0.0, 1.0),
        }
    }
}

/// Node: a single entry in the virtual tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Raw content type reported by the backend, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
}

impl Node {
    fn bare(id: impl Into<String>, name: impl Into<String>, kind: NodeKind, parent_id: Option<NodeId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            parent_id,
            size_label: None,
            date_label: None,
            source_url: None,
            thumbnail_url: None,
            content_type: None,
            capacity: None,
        }
    }

    pub(crate) fn root(name: &str) -> Self {
        Self::bare(crate::types::ROOT_ID, name, NodeKind::Container, None)
    }

    pub fn container(id: impl Into<String>, name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::bare(id, name, NodeKind::Container, Some(parent_id.into()))
    }

    pub fn video(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        let mut node = Self::bare(id, name, NodeKind::Video, Some(parent_id.into()));
        node.source_url = Some(source_url.into());
        node
    }

    pub fn leaf(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: NodeKind,
        parent_id: impl Into<String>,
    ) -> Self {
        Self::bare(id, name, kind, Some(parent_id.into()))
    }

    pub fn with_size(mut self, label: impl Into<String>) -> Self {
        self.size_label = Some(label.into());
        self
    }

    pub fn with_date(mut self, label: impl Into<String>) -> Self {
        self.date_label = Some(label.into());
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }

    pub fn is_video(&self) -> bool {
        self.kind == NodeKind::Video
    }

    /// Source URL when present and non-empty.
    pub fn stream_url(&self) -> Option<&str> {
        self.source_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Content type used when handing this node to a player directly.
    ///
    /// Falls back to a guess from the file extension, then to `video/*`.
    pub fn media_type(&self) -> String {
        if let Some(content_type) = self.content_type.as_deref().filter(|c| !c.is_empty()) {
            return content_type.to_string();
        }
        let ext = self
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("mp4") | Some("m4v") => "video/mp4".to_string(),
            Some("mkv") => "video/x-matroska".to_string(),
            Some("webm") => "video/webm".to_string(),
            Some("mov") => "video/quicktime".to_string(),
            Some("avi") => "video/x-msvideo".to_string(),
            _ => "video/*".to_string(),
        }
    }
}

/// Crumb: one `(id, name)` step of a breadcrumb path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    pub id: NodeId,
    pub name: String,
}

impl From<&Node> for Crumb {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
        }
    }
}
