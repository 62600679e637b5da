//! ConfigLoader: composes defaults, config files and environment overrides.

use super::{paths, ExplorerConfig};
use crate::error::ExplorerError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration.
    /// Precedence: global file (lowest) -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<ExplorerConfig, ExplorerError> {
        let mut builder = Config::builder();

        if let Some(global) = paths::global_config_file() {
            builder = builder.add_source(File::from(global).format(FileFormat::Toml).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("STREAMTREE")
                .separator("__")
                .try_parsing(true),
        );

        let config: ExplorerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string, without files or environment.
    pub fn from_toml(content: &str) -> Result<ExplorerConfig, ExplorerError> {
        let config: ExplorerConfig = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::BackendKind;

    #[test]
    fn toml_sections_are_parsed() {
        let config = ConfigLoader::from_toml(
            r#"
            [handoff]
            inline_limit = 1200
            launcher_program = "mpv"

            [providers.gdrive]
            backend = "remote"
            requires_auth = true
            page_size = 40

            [simulation]
            handshake_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.handoff.inline_limit, 1200);
        assert_eq!(config.handoff.launcher_program.as_deref(), Some("mpv"));
        let gdrive = &config.providers["gdrive"];
        assert_eq!(gdrive.backend, Some(BackendKind::Remote));
        assert!(gdrive.requires_auth);
        assert_eq!(gdrive.page_size, 40);
        assert_eq!(config.simulation.handshake_ms, 0);
        assert_eq!(config.simulation.list_latency_ms, 150);
    }

    #[test]
    fn explicit_file_is_required_and_validated() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("missing.toml");
        assert!(ConfigLoader::load(Some(&missing)).is_err());

        let bad = temp.path().join("bad.toml");
        std::fs::write(&bad, "[handoff]\ninline_limit = 0\n").unwrap();
        assert!(matches!(
            ConfigLoader::load(Some(&bad)),
            Err(ExplorerError::ConfigError(_))
        ));
    }
}
