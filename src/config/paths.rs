//! Platform directories for configuration, data and state.

use crate::error::ExplorerError;
use std::path::PathBuf;

fn project_dirs() -> Result<directories::ProjectDirs, ExplorerError> {
    directories::ProjectDirs::from("", "streamtree", "streamtree").ok_or_else(|| {
        ExplorerError::ConfigError(
            "Could not determine platform directories (HOME not set)".to_string(),
        )
    })
}

/// Global config file: `$XDG_CONFIG_HOME/streamtree/config.toml`
pub fn global_config_file() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("streamtree")
                .join("config.toml"),
        );
    }
    project_dirs()
        .ok()
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Default history database directory
pub fn history_dir() -> Result<PathBuf, ExplorerError> {
    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        return Ok(PathBuf::from(xdg_data_home)
            .join("streamtree")
            .join("history"));
    }
    Ok(project_dirs()?.data_dir().join("history"))
}

/// Default log directory
pub fn state_dir() -> Result<PathBuf, ExplorerError> {
    let dirs = project_dirs()?;
    Ok(dirs
        .state_dir()
        .map(|dir| dir.to_path_buf())
        .unwrap_or_else(|| dirs.data_local_dir().to_path_buf()))
}
