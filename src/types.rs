//! Core types shared across the virtual media tree.

/// NodeId: opaque, globally unique identifier of a tree node
pub type NodeId = String;

/// Id of the single root container every mount is grafted under
pub const ROOT_ID: &str = "root";

/// Display name of the root container
pub const ROOT_NAME: &str = "Network";
