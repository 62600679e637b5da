//! Configuration
//!
//! Layered settings for providers, playback handoff, history persistence, the simulated
//! latency seam and logging.

pub mod loader;
pub mod paths;

pub use loader::ConfigLoader;

use crate::error::ExplorerError;
use crate::logging::LoggingConfig;
use crate::provider::BackendKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-provider settings keyed by kind slug (gdrive, dropbox, onedrive, local)
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub handoff: HandoffConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub describe: DescribeConfig,
}

fn default_page_size() -> u32 {
    100
}

/// Settings for one provider kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Backend variant; unset means `static` for local and `simulated` for cloud kinds
    #[serde(default)]
    pub backend: Option<BackendKind>,

    /// Listing API base URL (remote backend)
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,

    /// Environment variable holding the access token
    #[serde(default)]
    pub access_token_env: Option<String>,

    /// Attach a bearer header to launches of this provider's media
    #[serde(default)]
    pub requires_auth: bool,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// JSON node catalog (static backend)
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            backend: None,
            endpoint: None,
            access_token: None,
            access_token_env: None,
            requires_auth: false,
            page_size: default_page_size(),
            catalog: None,
        }
    }
}

impl ProviderSettings {
    /// Token from config, falling back to the configured environment variable.
    pub fn resolve_access_token(&self) -> Option<String> {
        self.access_token.clone().or_else(|| {
            self.access_token_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|token| !token.is_empty())
        })
    }
}

fn default_handshake_ms() -> u64 {
    1500
}

fn default_list_latency_ms() -> u64 {
    150
}

/// Artificial delays for the simulated cloud backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_handshake_ms")]
    pub handshake_ms: u64,
    #[serde(default = "default_list_latency_ms")]
    pub list_latency_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            handshake_ms: default_handshake_ms(),
            list_latency_ms: default_list_latency_ms(),
        }
    }
}

impl SimulationConfig {
    pub fn handshake(&self) -> Duration {
        Duration::from_millis(self.handshake_ms)
    }

    pub fn list_latency(&self) -> Duration {
        Duration::from_millis(self.list_latency_ms)
    }
}

fn default_target_app() -> String {
    crate::handoff::DEFAULT_TARGET_APP.to_string()
}

fn default_inline_limit() -> usize {
    crate::handoff::INLINE_LIMIT
}

/// Playback handoff settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffConfig {
    #[serde(default = "default_target_app")]
    pub target_app: String,

    /// Largest encoded playlist locator, in characters, sent inline
    #[serde(default = "default_inline_limit")]
    pub inline_limit: usize,

    /// Local player program; unset means launches are only described, never executed
    #[serde(default)]
    pub launcher_program: Option<String>,

    #[serde(default)]
    pub launcher_args: Vec<String>,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            target_app: default_target_app(),
            inline_limit: default_inline_limit(),
            launcher_program: None,
            launcher_args: Vec::new(),
        }
    }
}

/// History persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// sled database directory; None means the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_describe_endpoint() -> String {
    crate::describe::DEFAULT_ENDPOINT.to_string()
}

fn default_describe_model() -> String {
    crate::describe::DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Content-description advisory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeConfig {
    #[serde(default = "default_describe_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_describe_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_describe_endpoint(),
            model: default_describe_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn endpoint_has_scheme(endpoint: &str) -> bool {
    endpoint.starts_with("http://") || endpoint.starts_with("https://")
}

impl ExplorerConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ExplorerError> {
        if self.handoff.inline_limit == 0 {
            return Err(ExplorerError::ConfigError(
                "handoff.inline_limit must be positive".to_string(),
            ));
        }
        if self.handoff.target_app.trim().is_empty() {
            return Err(ExplorerError::ConfigError(
                "handoff.target_app cannot be empty".to_string(),
            ));
        }
        for (slug, settings) in &self.providers {
            crate::provider::ProviderKind::parse(slug)?;
            if !(1..=crate::provider::remote::MAX_PAGE_SIZE).contains(&settings.page_size) {
                return Err(ExplorerError::ConfigError(format!(
                    "providers.{}.page_size must be between 1 and 100, got {}",
                    slug, settings.page_size
                )));
            }
            if let Some(endpoint) = &settings.endpoint {
                if !endpoint_has_scheme(endpoint) {
                    return Err(ExplorerError::ConfigError(format!(
                        "Invalid endpoint URL for {}: {}",
                        slug, endpoint
                    )));
                }
            }
        }
        if !endpoint_has_scheme(&self.describe.endpoint) {
            return Err(ExplorerError::ConfigError(format!(
                "Invalid describe endpoint URL: {}",
                self.describe.endpoint
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ExplorerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.handoff.inline_limit, 50_000);
        assert_eq!(config.simulation.handshake(), Duration::from_millis(1500));
    }

    #[test]
    fn page_size_over_limit_is_rejected() {
        let mut config = ExplorerConfig::default();
        config.providers.insert(
            "gdrive".to_string(),
            ProviderSettings {
                page_size: 500,
                ..ProviderSettings::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_provider_slug_is_rejected() {
        let mut config = ExplorerConfig::default();
        config
            .providers
            .insert("smb".to_string(), ProviderSettings::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn access_token_falls_back_to_env() {
        std::env::set_var("STREAMTREE_TEST_TOKEN", "from-env");
        let settings = ProviderSettings {
            access_token_env: Some("STREAMTREE_TEST_TOKEN".to_string()),
            ..ProviderSettings::default()
        };
        let token = settings.resolve_access_token();
        std::env::remove_var("STREAMTREE_TEST_TOKEN");
        assert_eq!(token.as_deref(), Some("from-env"));
    }
}
