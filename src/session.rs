//! Explorer session
//!
//! Owns the node store and wires it to providers, the navigator, history and playback
//! handoff. All methods take `&self`; interior state sits behind parking_lot locks that are
//! never held across an `.await`.

use crate::config::{paths, ExplorerConfig};
use crate::describe::{Describer, GeminiDescriber};
use crate::error::ExplorerError;
use crate::handoff::{HandoffBuilder, LaunchDescriptor, Launcher, ProcessLauncher};
use crate::history::{HistoryEntry, HistoryLedger, HistoryStore, SledHistoryStore};
use crate::navigator::{Navigator, TreeSource};
use crate::provider::{ProviderKind, ProviderRegistry};
use crate::store::{Crumb, Node, NodeStore};
use crate::types::{NodeId, ROOT_ID};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

type SharedListing = Shared<BoxFuture<'static, Result<Vec<Node>, ExplorerError>>>;

/// Returned by [`Session::properties`] when no describer is configured
pub const NO_ANALYSIS: &str = "No analysis available.";

/// Detail view of one node
#[derive(Debug, Clone, Serialize)]
pub struct Properties {
    pub node: Node,
    pub provider: Option<ProviderKind>,
    pub location: Vec<Crumb>,
    pub description: String,
}

/// Clears a kind from the in-flight mount set when the mount finishes or is dropped
struct MountGuard<'a> {
    mounting: &'a Mutex<HashSet<ProviderKind>>,
    kind: ProviderKind,
}

impl Drop for MountGuard<'_> {
    fn drop(&mut self) {
        self.mounting.lock().remove(&self.kind);
    }
}

/// Explorer session
pub struct Session {
    store: RwLock<NodeStore>,
    providers: ProviderRegistry,
    /// Mount point id -> provider that serves everything below it
    owners: RwLock<HashMap<NodeId, ProviderKind>>,
    navigator: Mutex<Navigator>,
    history: Mutex<HistoryLedger>,
    handoff: HandoffBuilder,
    launcher: Box<dyn Launcher>,
    describer: Option<Arc<dyn Describer>>,
    mounting: Mutex<HashSet<ProviderKind>>,
    listings: Mutex<HashMap<NodeId, (u64, SharedListing)>>,
    next_ticket: Mutex<u64>,
}

impl Session {
    pub fn new(providers: ProviderRegistry, history_store: Arc<dyn HistoryStore>) -> Self {
        Self {
            store: RwLock::new(NodeStore::new()),
            providers,
            owners: RwLock::new(HashMap::new()),
            navigator: Mutex::new(Navigator::new()),
            history: Mutex::new(HistoryLedger::load(history_store)),
            handoff: HandoffBuilder::default(),
            launcher: Box::new(crate::handoff::DryRunLauncher),
            describer: None,
            mounting: Mutex::new(HashSet::new()),
            listings: Mutex::new(HashMap::new()),
            next_ticket: Mutex::new(0),
        }
    }

    pub fn with_handoff(mut self, handoff: HandoffBuilder) -> Self {
        self.handoff = handoff;
        self
    }

    pub fn with_launcher(mut self, launcher: Box<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_describer(mut self, describer: Arc<dyn Describer>) -> Self {
        self.describer = Some(describer);
        self
    }

    /// Wire a session from configuration: registry, sled history, launcher and describer.
    pub fn from_config(config: &ExplorerConfig) -> Result<Self, ExplorerError> {
        let providers = ProviderRegistry::from_config(config)?;
        let history_path = match &config.history.path {
            Some(path) => path.clone(),
            None => paths::history_dir()?,
        };
        let history_store = SledHistoryStore::open(&history_path)?;
        debug!(path = %history_path.display(), "Opened history store");

        Ok(Self::new(providers, Arc::new(history_store))
            .with_handoff(HandoffBuilder::from_config(&config.handoff))
            .with_launcher(ProcessLauncher::from_config(&config.handoff))
            .with_describer(Arc::new(GeminiDescriber::from_config(&config.describe))))
    }

    /// Mount a provider under root and return its mount point.
    ///
    /// Mounting an already mounted kind returns the existing mount point. A second mount of a
    /// kind whose handshake is still running fails with `MountInProgress`.
    pub async fn mount(&self, kind: ProviderKind) -> Result<Node, ExplorerError> {
        if let Some(existing) = self.mount_point_of(kind) {
            debug!(provider = %kind, "Already mounted");
            return Ok(existing);
        }
        if !self.mounting.lock().insert(kind) {
            return Err(ExplorerError::MountInProgress(kind.to_string()));
        }
        let _guard = MountGuard {
            mounting: &self.mounting,
            kind,
        };

        let entry = self.providers.get(kind)?;
        info!(provider = %kind, "Mounting provider");
        let nodes = entry.adapter.mount(kind).await?;
        let top_ids: Vec<NodeId> = nodes
            .iter()
            .filter(|node| node.parent_id.as_deref() == Some(ROOT_ID))
            .map(|node| node.id.clone())
            .collect();

        if !self.store.write().mount_subtree(ROOT_ID, nodes)? {
            let owners = self.owners.read();
            let holder = top_ids.iter().find_map(|id| owners.get(id).map(|owner| (id, *owner)));
            return Err(match holder {
                Some((id, owner)) => {
                    warn!(provider = %kind, mount_point = %id, owner = %owner, "Mount point already in use");
                    ExplorerError::StoreIntegrity(format!(
                        "mount point {} is already served by {}",
                        id, owner
                    ))
                }
                None => ExplorerError::StoreIntegrity(format!(
                    "{} mount points already exist in the store",
                    kind
                )),
            });
        }
        {
            let mut owners = self.owners.write();
            for id in &top_ids {
                owners.insert(id.clone(), kind);
            }
        }
        info!(provider = %kind, mount_points = top_ids.len(), "Provider mounted");

        self.mount_point_of(kind)
            .ok_or_else(|| ExplorerError::StoreIntegrity(format!("{} mounted without a mount point", kind)))
    }

    fn mount_point_of(&self, kind: ProviderKind) -> Option<Node> {
        let owners = self.owners.read();
        let store = self.store.read();
        store
            .mount_points()
            .into_iter()
            .find(|node| owners.get(&node.id) == Some(&kind))
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Provider kinds currently mounted, in mount-point order.
    pub fn mounted(&self) -> Vec<ProviderKind> {
        let owners = self.owners.read();
        let store = self.store.read();
        store
            .mount_points()
            .iter()
            .filter_map(|node| owners.get(&node.id).copied())
            .collect()
    }

    /// The provider serving `id`; `None` for root.
    pub fn owner_of(&self, id: &str) -> Result<Option<ProviderKind>, ExplorerError> {
        let crumbs = self.store.read().ancestry(id)?;
        Ok(crumbs
            .get(1)
            .and_then(|mount| self.owners.read().get(&mount.id).copied()))
    }

    /// Fetch the children of `id` from its provider and commit them with a full replace.
    ///
    /// Concurrent fetches of the same container share one provider call. A failed listing
    /// leaves the store untouched.
    async fn list_and_commit(&self, id: &str) -> Result<(), ExplorerError> {
        let Some(kind) = self.owner_of(id)? else {
            // Root's children are the mount points
            return Ok(());
        };
        let adapter = self.providers.get(kind)?.adapter.clone();

        let (ticket, listing) = {
            let mut listings = self.listings.lock();
            match listings.get(id) {
                Some((ticket, shared)) => {
                    debug!(node = id, "Joining in-flight listing");
                    (*ticket, shared.clone())
                }
                None => {
                    let ticket = {
                        let mut next = self.next_ticket.lock();
                        *next += 1;
                        *next
                    };
                    let target = id.to_string();
                    let shared = async move { adapter.list_children(&target).await }
                        .boxed()
                        .shared();
                    listings.insert(id.to_string(), (ticket, shared.clone()));
                    (ticket, shared)
                }
            }
        };

        let result = listing.await;
        {
            let mut listings = self.listings.lock();
            if listings.get(id).map(|(t, _)| *t) == Some(ticket) {
                listings.remove(id);
            }
        }

        match result {
            Ok(children) => {
                debug!(node = id, count = children.len(), "Listing received");
                let mut navigator = self.navigator.lock();
                let mut store = self.store.write();
                store.upsert_subtree(id, children)?;
                if !store.contains(navigator.current_id()) {
                    warn!(
                        removed = navigator.current_id(),
                        parent = id,
                        "Current container dropped by a re-list, moving to its listed ancestor"
                    );
                    navigator.jump_to(id);
                }
                Ok(())
            }
            Err(e) => {
                warn!(node = id, error = %e, "Listing failed");
                Err(e)
            }
        }
    }

    /// Enter container `id`, fetching its children when none are cached.
    pub async fn enter(&self, id: &str) -> Result<(), ExplorerError> {
        let mut navigator = self.navigator.lock().clone();
        navigator.enter(self, id).await?;
        *self.navigator.lock() = navigator;
        Ok(())
    }

    /// Move to the parent container. Returns `false` at root.
    pub fn go_up(&self) -> bool {
        let mut navigator = self.navigator.lock();
        navigator.go_up(self)
    }

    pub fn current_id(&self) -> NodeId {
        self.navigator.lock().current_id().to_string()
    }

    pub fn breadcrumbs(&self) -> Result<Vec<Crumb>, ExplorerError> {
        let navigator = self.navigator.lock().clone();
        navigator.breadcrumbs(self)
    }

    /// Children of the current container, containers first.
    pub fn current_children(&self) -> Vec<Node> {
        let current = self.current_id();
        self.store.read().list_children(&current)
    }

    pub fn node(&self, id: &str) -> Option<Node> {
        self.store.read().node(id).cloned()
    }

    /// Re-list the current container regardless of cache state.
    pub async fn refresh(&self) -> Result<(), ExplorerError> {
        let current = self.current_id();
        self.list_and_commit(&current).await
    }

    /// Build the launch descriptor for leaf `id` in the current container without launching.
    pub fn prepare_launch(&self, id: &str) -> Result<LaunchDescriptor, ExplorerError> {
        let current = self.current_id();
        let siblings = self.store.read().list_children(&current);
        let token = match self.owner_of(&current)? {
            Some(kind) => self.providers.get(kind)?.launch_token().map(str::to_string),
            None => None,
        };
        self.handoff.build(&siblings, id, token.as_deref())
    }

    /// Activate leaf `id`: build the descriptor, record history, hand off to the launcher.
    pub fn activate(&self, id: &str) -> Result<LaunchDescriptor, ExplorerError> {
        let descriptor = self.prepare_launch(id)?;
        let node = self
            .node(id)
            .ok_or_else(|| ExplorerError::NodeNotFound(id.to_string()))?;
        let origin = self.current_id();
        self.history.lock().record(&node, &origin);
        self.launcher.launch(&descriptor)?;
        info!(node = id, items = descriptor.item_count, "Playback handed off");
        Ok(descriptor)
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().entries().to_vec()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// Resolve a history entry against the live tree. `None` means the node is not loaded.
    pub fn resolve_history(&self, entry: &HistoryEntry) -> Option<Node> {
        let store = self.store.read();
        self.history.lock().resolve(entry, &store)
    }

    /// Navigate to the entry's origin container and activate it again.
    ///
    /// Returns `Ok(None)` when either the node or its origin is no longer in the tree.
    pub async fn replay(&self, entry: &HistoryEntry) -> Result<Option<LaunchDescriptor>, ExplorerError> {
        if self.resolve_history(entry).is_none() || self.node(&entry.file_path).is_none() {
            debug!(file = %entry.file_id, "History entry not in the loaded tree");
            return Ok(None);
        }
        self.enter(&entry.file_path).await?;
        self.activate(&entry.file_id).map(Some)
    }

    /// Node details plus an advisory description.
    pub async fn properties(&self, id: &str) -> Result<Properties, ExplorerError> {
        let node = self
            .node(id)
            .ok_or_else(|| ExplorerError::NodeNotFound(id.to_string()))?;
        let location = self.store.read().ancestry(id)?;
        let provider = self.owner_of(id)?;
        let description = match &self.describer {
            Some(describer) => describer.describe(&node.name).await,
            None => NO_ANALYSIS.to_string(),
        };
        Ok(Properties {
            node,
            provider,
            location,
            description,
        })
    }
}

#[async_trait]
impl TreeSource for Session {
    fn lookup(&self, id: &str) -> Option<Node> {
        self.node(id)
    }

    fn is_cached(&self, id: &str) -> bool {
        self.store.read().is_listed(id)
    }

    async fn fetch_children(&self, id: &str) -> Result<(), ExplorerError> {
        self.list_and_commit(id).await
    }

    fn ancestry(&self, id: &str) -> Result<Vec<Crumb>, ExplorerError> {
        self.store.read().ancestry(id)
    }
}
