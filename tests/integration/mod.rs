//! Integration tests for the streamtree explorer

mod browse_flow;
mod history_persistence;
mod listing_failures;
mod playlist_handoff;
