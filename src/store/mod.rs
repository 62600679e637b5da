//! Node Store
//!
//! In-memory table of tree nodes. Single source of truth for identity, hierarchy and
//! display metadata. Children of a container are cached per parent id and replaced
//! wholesale on every re-list.

mod node;

pub use node::{Capacity, Crumb, Node, NodeKind};

use crate::error::ExplorerError;
use crate::types::{NodeId, ROOT_ID, ROOT_NAME};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, warn};

/// NodeStore: owns every node record for the lifetime of a session
#[derive(Debug)]
pub struct NodeStore {
    nodes: HashMap<NodeId, Node>,
    /// Parent id -> child ids in insertion/fetch order
    children: HashMap<NodeId, Vec<NodeId>>,
    /// Containers whose children came from a completed listing
    listed: HashSet<NodeId>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Create a store holding only the root container.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_ID.to_string(), Node::root(ROOT_NAME));
        let mut listed = HashSet::new();
        // Root children only ever arrive through mounts.
        listed.insert(ROOT_ID.to_string());
        Self {
            nodes,
            children: HashMap::new(),
            listed,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_node(&self, id: &str) -> Result<&Node, ExplorerError> {
        self.nodes
            .get(id)
            .ok_or_else(|| ExplorerError::NodeNotFound(id.to_string()))
    }

    /// True once a listing for this container has been committed.
    pub fn is_listed(&self, id: &str) -> bool {
        self.listed.contains(id)
    }

    /// Children of `id`, containers first, otherwise in fetch order.
    ///
    /// Unknown or never-listed containers yield an empty sequence.
    pub fn list_children(&self, id: &str) -> Vec<Node> {
        let Some(ids) = self.children.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<Node> = ids
            .iter()
            .filter_map(|child_id| self.nodes.get(child_id).cloned())
            .collect();
        // sort_by_key is stable, so fetch order survives within each group
        out.sort_by_key(|node| !node.is_container());
        out
    }

    /// Mount points: the containers grafted directly under root.
    pub fn mount_points(&self) -> Vec<Node> {
        self.list_children(ROOT_ID)
    }

    fn require_container(&self, id: &str) -> Result<&Node, ExplorerError> {
        let node = self.get_node(id)?;
        if !node.is_container() {
            return Err(ExplorerError::NotAContainer(id.to_string()));
        }
        Ok(node)
    }

    fn ancestor_ids(&self, id: &str) -> Result<HashSet<NodeId>, ExplorerError> {
        Ok(self
            .ancestry(id)?
            .into_iter()
            .map(|crumb| crumb.id)
            .collect())
    }

    /// Replace the cached children of `parent_id` with `nodes`.
    ///
    /// Previous children missing from `nodes` are dropped together with their subtrees.
    /// Every incoming node is re-parented to `parent_id`. Duplicate ids inside the batch
    /// keep their first position and the last record.
    pub fn upsert_subtree(&mut self, parent_id: &str, nodes: Vec<Node>) -> Result<(), ExplorerError> {
        self.require_container(parent_id)?;
        let ancestors = self.ancestor_ids(parent_id)?;

        let mut order: Vec<NodeId> = Vec::with_capacity(nodes.len());
        let mut incoming: HashMap<NodeId, Node> = HashMap::with_capacity(nodes.len());
        for mut node in nodes {
            if ancestors.contains(&node.id) {
                return Err(ExplorerError::StoreIntegrity(format!(
                    "node {} cannot be listed under its own descendant {}",
                    node.id, parent_id
                )));
            }
            node.parent_id = Some(parent_id.to_string());
            let id = node.id.clone();
            if incoming.insert(id.clone(), node).is_some() {
                warn!(parent = parent_id, node = %id, "Duplicate id in listing, keeping last record");
            } else {
                order.push(id);
            }
        }

        let previous = self.children.remove(parent_id).unwrap_or_default();
        for stale in previous.iter().filter(|id| !incoming.contains_key(*id)) {
            self.remove_subtree(stale);
        }

        for id in &order {
            let Some(node) = incoming.remove(id) else {
                continue;
            };
            if let Some(existing) = self.nodes.get(id) {
                if existing.parent_id.as_deref() != Some(parent_id) {
                    if let Some(old_parent) = existing.parent_id.clone() {
                        self.detach(&old_parent, id);
                    }
                }
            }
            if !node.is_container() {
                self.remove_descendants(id);
            }
            self.nodes.insert(id.clone(), node);
        }

        debug!(parent = parent_id, count = order.len(), "Committed listing");
        self.children.insert(parent_id.to_string(), order);
        self.listed.insert(parent_id.to_string());
        Ok(())
    }

    /// Graft a subtree under `anchor_id` without touching existing siblings.
    ///
    /// Top-level nodes are those whose parent is the anchor; every other node must hang off a
    /// node in the same batch. Returns `false` without changes when a top-level id is already
    /// mounted under the anchor.
    pub fn mount_subtree(&mut self, anchor_id: &str, nodes: Vec<Node>) -> Result<bool, ExplorerError> {
        self.require_container(anchor_id)?;

        let existing_children = self.children.get(anchor_id);
        let already_mounted = nodes.iter().any(|node| {
            node.parent_id.as_deref() == Some(anchor_id)
                && existing_children.map_or(false, |ids| ids.contains(&node.id))
        });
        if already_mounted {
            debug!(anchor = anchor_id, "Subtree already mounted, skipping");
            return Ok(false);
        }

        let batch: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        if batch.len() != nodes.len() {
            return Err(ExplorerError::StoreIntegrity(
                "mount batch contains duplicate ids".to_string(),
            ));
        }
        if !nodes.iter().any(|n| n.parent_id.as_deref() == Some(anchor_id)) {
            return Err(ExplorerError::StoreIntegrity(format!(
                "mount batch has no node anchored at {}",
                anchor_id
            )));
        }
        for node in &nodes {
            if self.nodes.contains_key(&node.id) {
                return Err(ExplorerError::StoreIntegrity(format!(
                    "node id {} already exists in the store",
                    node.id
                )));
            }
            // Each chain must reach the anchor inside the batch within batch.len() steps.
            let mut cursor = node;
            let mut steps = 0;
            loop {
                match cursor.parent_id.as_deref() {
                    Some(parent) if parent == anchor_id => break,
                    Some(parent) => match batch.get(parent) {
                        Some(next) if steps < batch.len() => {
                            cursor = *next;
                            steps += 1;
                        }
                        Some(_) => {
                            return Err(ExplorerError::StoreIntegrity(format!(
                                "cycle in mount batch at {}",
                                node.id
                            )))
                        }
                        None => {
                            return Err(ExplorerError::StoreIntegrity(format!(
                                "node {} references parent {} outside the mount",
                                node.id, parent
                            )))
                        }
                    },
                    None => {
                        return Err(ExplorerError::StoreIntegrity(format!(
                            "node {} has no parent",
                            node.id
                        )))
                    }
                }
            }
        }

        for node in nodes {
            let parent = node.parent_id.clone().unwrap_or_else(|| anchor_id.to_string());
            self.children
                .entry(parent)
                .or_default()
                .push(node.id.clone());
            self.nodes.insert(node.id.clone(), node);
        }
        Ok(true)
    }

    /// Walk parent links from `id` up to root and return `[root, ..., id]`.
    ///
    /// A revisited node is a store-integrity violation and is logged, never looped on.
    pub fn ancestry(&self, id: &str) -> Result<Vec<Crumb>, ExplorerError> {
        let mut crumbs = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(self.get_node(id)?);
        while let Some(node) = cursor {
            if !seen.insert(node.id.as_str()) || crumbs.len() > self.nodes.len() {
                error!(node = %node.id, start = id, "Cycle detected while walking parent links");
                return Err(ExplorerError::StoreIntegrity(format!(
                    "cycle through {} while resolving {}",
                    node.id, id
                )));
            }
            crumbs.push(Crumb::from(node));
            cursor = match node.parent_id.as_deref() {
                Some(parent) => Some(self.nodes.get(parent).ok_or_else(|| {
                    error!(node = %node.id, parent, "Orphaned node");
                    ExplorerError::StoreIntegrity(format!(
                        "{} references missing parent {}",
                        node.id, parent
                    ))
                })?),
                None => None,
            };
        }
        crumbs.reverse();
        Ok(crumbs)
    }

    fn detach(&mut self, parent_id: &str, child_id: &str) {
        if let Some(ids) = self.children.get_mut(parent_id) {
            ids.retain(|id| id != child_id);
        }
    }

    fn remove_descendants(&mut self, id: &str) {
        let mut pending = self.children.remove(id).unwrap_or_default();
        self.listed.remove(id);
        while let Some(next) = pending.pop() {
            self.nodes.remove(&next);
            self.listed.remove(&next);
            if let Some(grandchildren) = self.children.remove(&next) {
                pending.extend(grandchildren);
            }
        }
    }

    fn remove_subtree(&mut self, id: &str) {
        self.remove_descendants(id);
        self.nodes.remove(id);
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, node: Node) {
        if let Some(parent) = node.parent_id.clone() {
            self.children.entry(parent).or_default().push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
    }
}
