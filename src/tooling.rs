//! Tooling & Integration Layer
//!
//! Command-line front end: one-shot commands for scripting plus an interactive shell.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
