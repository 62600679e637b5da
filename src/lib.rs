//! Streamtree: a virtual media tree over local, simulated and remote drives.
//!
//! Providers are mounted under a single root, containers are listed lazily as the user
//! navigates, and activating a video hands a playlist of its siblings to an external player.

pub mod config;
pub mod describe;
pub mod error;
pub mod handoff;
pub mod history;
pub mod logging;
pub mod navigator;
pub mod playlist;
pub mod provider;
pub mod session;
pub mod store;
pub mod tooling;
pub mod types;

pub use error::ExplorerError;
pub use session::Session;
