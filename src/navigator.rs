//! Navigator
//!
//! Cursor over the tree: holds only the id of the current container and reads everything
//! else through a [`TreeSource`].

use crate::error::ExplorerError;
use crate::store::{Crumb, Node};
use crate::types::{NodeId, ROOT_ID};
use async_trait::async_trait;
use tracing::debug;

/// Read access to the tree plus the ability to fetch a container's children
#[async_trait]
pub trait TreeSource: Send + Sync {
    fn lookup(&self, id: &str) -> Option<Node>;

    /// Whether `id` already has a committed listing
    fn is_cached(&self, id: &str) -> bool;

    /// Fetch and commit the children of `id`
    async fn fetch_children(&self, id: &str) -> Result<(), ExplorerError>;

    /// `[root, ..., id]`
    fn ancestry(&self, id: &str) -> Result<Vec<Crumb>, ExplorerError>;
}

/// Navigator state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    current_id: NodeId,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current_id: ROOT_ID.to_string(),
        }
    }

    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    /// Move into container `node_id`, listing it first when nothing is cached.
    ///
    /// On any failure the cursor stays where it was.
    pub async fn enter<S>(&mut self, source: &S, node_id: &str) -> Result<(), ExplorerError>
    where
        S: TreeSource + ?Sized,
    {
        let node = source
            .lookup(node_id)
            .ok_or_else(|| ExplorerError::NodeNotFound(node_id.to_string()))?;
        if !node.is_container() {
            return Err(ExplorerError::NotAContainer(node_id.to_string()));
        }
        if source.is_cached(node_id) {
            debug!(node = node_id, "Children cached");
        } else {
            source.fetch_children(node_id).await?;
        }
        self.current_id = node.id;
        Ok(())
    }

    /// Place the cursor on `node_id` without listing it.
    pub fn jump_to(&mut self, node_id: impl Into<NodeId>) {
        self.current_id = node_id.into();
    }

    /// Move to the parent container. Returns `false` at root.
    pub fn go_up<S>(&mut self, source: &S) -> bool
    where
        S: TreeSource + ?Sized,
    {
        match source.lookup(&self.current_id).and_then(|node| node.parent_id) {
            Some(parent) => {
                self.current_id = parent;
                true
            }
            None => false,
        }
    }

    pub fn breadcrumbs<S>(&self, source: &S) -> Result<Vec<Crumb>, ExplorerError>
    where
        S: TreeSource + ?Sized,
    {
        source.ancestry(&self.current_id)
    }
}
