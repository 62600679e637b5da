//! Simulated cloud drives backed by canned templates.
//!
//! The handshake and listing delays are a test seam only; both default to zero.

use super::ProviderKind;
use crate::error::ExplorerError;
use crate::store::{Capacity, Node};
use crate::types::ROOT_ID;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const SAMPLE_BUCKET: &str = "https://storage.googleapis.com/gtv-videos-bucket/sample";

fn sample(file: &str) -> String {
    format!("{}/{}", SAMPLE_BUCKET, file)
}

fn poster(file: &str) -> String {
    format!("{}/images/{}", SAMPLE_BUCKET, file)
}

fn gdrive_template() -> Vec<Node> {
    vec![
        Node::container("gd-root", "Google Drive (Demo)", ROOT_ID)
            .with_size("15GB")
            .with_date("Synced")
            .with_capacity(Capacity::new("45 GB", "100 GB", 0.45)),
        Node::container("gd-movies", "Movies", "gd-root").with_date("2023-11-10"),
        Node::container("gd-tv", "TV Shows", "gd-root").with_date("2023-11-12"),
        Node::video("mov-1", "Big Buck Bunny.mp4", "gd-movies", sample("BigBuckBunny.mp4"))
            .with_thumbnail(poster("BigBuckBunny.jpg"))
            .with_size("150MB")
            .with_date("2023-11-01"),
        Node::video("mov-2", "Elephant Dreams.mp4", "gd-movies", sample("ElephantsDream.mp4"))
            .with_thumbnail(poster("ElephantsDream.jpg"))
            .with_size("120MB")
            .with_date("2023-11-02"),
        Node::video("mov-3", "Sintel (4K).mp4", "gd-movies", sample("Sintel.mp4"))
            .with_thumbnail(poster("Sintel.jpg"))
            .with_size("210MB")
            .with_date("2023-11-03"),
        Node::video("tv-1", "Review_S01E01.mp4", "gd-tv", sample("VolkswagenGTIReview.mp4"))
            .with_thumbnail(poster("VolkswagenGTIReview.jpg"))
            .with_size("450MB")
            .with_date("2023-12-01"),
    ]
}

fn dropbox_template() -> Vec<Node> {
    vec![
        Node::container("db-root", "Dropbox (Demo)", ROOT_ID)
            .with_date("Synced")
            .with_capacity(Capacity::new("1.2 GB", "2 GB", 0.6)),
        Node::container("db-clips", "Clips", "db-root").with_date("2024-02-03"),
        Node::video("db-clip-1", "For Bigger Blazes.mp4", "db-clips", sample("ForBiggerBlazes.mp4"))
            .with_thumbnail(poster("ForBiggerBlazes.jpg"))
            .with_size("2.4MB")
            .with_date("2024-02-03"),
        Node::video("db-clip-2", "For Bigger Escapes.mp4", "db-clips", sample("ForBiggerEscapes.mp4"))
            .with_thumbnail(poster("ForBiggerEscapes.jpg"))
            .with_size("2.2MB")
            .with_date("2024-02-04"),
        Node::leaf("db-poster", "poster.jpg", crate::store::NodeKind::Image, "db-clips")
            .with_size("340KB"),
    ]
}

fn onedrive_template() -> Vec<Node> {
    vec![
        Node::container("od-root", "OneDrive (Demo)", ROOT_ID)
            .with_date("Synced")
            .with_capacity(Capacity::new("800 MB", "5 GB", 0.16)),
        Node::container("od-videos", "Videos", "od-root").with_date("2024-05-20"),
        Node::video("od-vid-1", "Tears of Steel.mp4", "od-videos", sample("TearsOfSteel.mp4"))
            .with_thumbnail(poster("TearsOfSteel.jpg"))
            .with_size("185MB")
            .with_date("2024-05-20"),
        Node::leaf("od-notes", "notes.txt", crate::store::NodeKind::Opaque, "od-videos")
            .with_size("2KB"),
    ]
}

/// Canned subtree for each mountable cloud kind.
pub fn default_templates() -> HashMap<ProviderKind, Vec<Node>> {
    let mut templates = HashMap::new();
    templates.insert(ProviderKind::GoogleDrive, gdrive_template());
    templates.insert(ProviderKind::Dropbox, dropbox_template());
    templates.insert(ProviderKind::OneDrive, onedrive_template());
    templates
}

/// Simulated cloud provider
#[derive(Debug, Clone)]
pub struct SimulatedCloudProvider {
    templates: HashMap<ProviderKind, Vec<Node>>,
    handshake: Duration,
    list_latency: Duration,
}

impl Default for SimulatedCloudProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCloudProvider {
    pub fn new() -> Self {
        Self::with_templates(default_templates())
    }

    pub fn with_templates(templates: HashMap<ProviderKind, Vec<Node>>) -> Self {
        Self {
            templates,
            handshake: Duration::ZERO,
            list_latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, handshake: Duration, list_latency: Duration) -> Self {
        self.handshake = handshake;
        self.list_latency = list_latency;
        self
    }

    async fn pause(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Children of `node_id` across every template, in template order.
    pub async fn list_children(&self, node_id: &str) -> Result<Vec<Node>, ExplorerError> {
        Self::pause(self.list_latency).await;
        let mut kinds: Vec<&ProviderKind> = self.templates.keys().collect();
        kinds.sort();
        Ok(kinds
            .into_iter()
            .flat_map(|kind| self.templates[kind].iter())
            .filter(|node| node.parent_id.as_deref() == Some(node_id))
            .cloned()
            .collect())
    }

    /// Runs the fixed-length sign-in handshake, then returns the canned subtree.
    pub async fn mount(&self, kind: ProviderKind) -> Result<Vec<Node>, ExplorerError> {
        Self::pause(self.handshake).await;
        let nodes = self
            .templates
            .get(&kind)
            .cloned()
            .ok_or_else(|| ExplorerError::MountUnsupported(kind.to_string()))?;
        debug!(provider = %kind, count = nodes.len(), "Simulated mount ready");
        Ok(nodes)
    }
}
