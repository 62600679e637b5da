//! Provider registry: which adapter serves each mountable kind.

use super::clients::DriveHttpClient;
use super::{
    BackendKind, ProviderAdapter, ProviderKind, RemoteListingProvider, SimulatedCloudProvider,
    StaticProvider,
};
use crate::config::{ExplorerConfig, ProviderSettings};
use crate::error::ExplorerError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A registered adapter plus its launch-time auth capability
#[derive(Debug, Clone)]
pub struct ProviderEntry {
    pub adapter: Arc<ProviderAdapter>,
    /// Whether media URLs from this provider need a bearer header at launch time
    pub requires_auth: bool,
    access_token: Option<String>,
}

impl ProviderEntry {
    pub fn new(adapter: ProviderAdapter) -> Self {
        Self {
            adapter: Arc::new(adapter),
            requires_auth: false,
            access_token: None,
        }
    }

    pub fn with_auth(mut self, access_token: Option<String>) -> Self {
        self.requires_auth = true;
        self.access_token = access_token;
        self
    }

    /// Token to attach to a launch, if this provider needs one and has one.
    pub fn launch_token(&self) -> Option<&str> {
        if self.requires_auth {
            self.access_token.as_deref()
        } else {
            None
        }
    }
}

/// Provider registry
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    entries: HashMap<ProviderKind, ProviderEntry>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ProviderKind, entry: ProviderEntry) {
        self.entries.insert(kind, entry);
    }

    pub fn with(mut self, kind: ProviderKind, entry: ProviderEntry) -> Self {
        self.register(kind, entry);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Result<&ProviderEntry, ExplorerError> {
        self.entries
            .get(&kind)
            .ok_or_else(|| ExplorerError::MountUnsupported(kind.to_string()))
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.entries.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Build one adapter per provider kind from configuration.
    pub fn from_config(config: &ExplorerConfig) -> Result<Self, ExplorerError> {
        let mut registry = Self::new();
        for kind in ProviderKind::ALL {
            let settings = config
                .providers
                .get(kind.slug())
                .cloned()
                .unwrap_or_default();
            let entry = Self::build_entry(kind, &settings, config)?;
            debug!(provider = %kind, backend = ?entry.adapter.backend(), "Registered provider");
            registry.register(kind, entry);
        }
        Ok(registry)
    }

    fn build_entry(
        kind: ProviderKind,
        settings: &ProviderSettings,
        config: &ExplorerConfig,
    ) -> Result<ProviderEntry, ExplorerError> {
        let backend = settings.backend.unwrap_or(match kind {
            ProviderKind::Local => BackendKind::Static,
            _ => BackendKind::Simulated,
        });
        let token = settings.resolve_access_token();

        let adapter = match backend {
            BackendKind::Static => {
                let provider = match &settings.catalog {
                    Some(path) => StaticProvider::from_catalog_file(path)?,
                    None => StaticProvider::sample_library(),
                };
                ProviderAdapter::Static(provider)
            }
            BackendKind::Simulated => ProviderAdapter::SimulatedCloud(
                SimulatedCloudProvider::new().with_latency(
                    config.simulation.handshake(),
                    config.simulation.list_latency(),
                ),
            ),
            BackendKind::Remote => {
                let client = DriveHttpClient::new(settings.endpoint.clone(), token.clone());
                ProviderAdapter::RemoteListing(
                    RemoteListingProvider::new(Arc::new(client), settings.page_size).for_kind(kind),
                )
            }
        };

        let entry = ProviderEntry::new(adapter);
        Ok(if settings.requires_auth {
            entry.with_auth(token)
        } else {
            entry
        })
    }
}
