use std::path::Path;
use std::sync::Mutex;

use streamtree::config::{ConfigLoader, ExplorerConfig};
use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with XDG directories pointed into `temp_dir`.
pub fn with_xdg_env<F: FnOnce()>(temp_dir: &TempDir, f: F) {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = ["XDG_CONFIG_HOME", "XDG_DATA_HOME"]
        .into_iter()
        .map(|key| (key, std::env::var(key).ok()))
        .collect();
    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path().join("config"));
    std::env::set_var("XDG_DATA_HOME", temp_dir.path().join("data"));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, value) in saved {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
    if let Err(panic) = result {
        std::panic::resume_unwind(panic);
    }
}

/// Config with no simulated latency, history under `dir`, and logging off.
pub fn test_config_toml(dir: &Path) -> String {
    format!(
        r#"
[logging]
enabled = false

[simulation]
handshake_ms = 0
list_latency_ms = 0

[history]
path = "{}"
"#,
        dir.join("history").display()
    )
}

pub fn test_config(dir: &Path) -> ExplorerConfig {
    ConfigLoader::from_toml(&test_config_toml(dir)).unwrap()
}
