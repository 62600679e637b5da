use std::fs;

use streamtree::tooling::cli::{CliContext, Commands};
use tempfile::TempDir;

use crate::support::{test_config, test_config_toml, with_xdg_env};

fn play(target: &str, dry_run: bool) -> Commands {
    Commands::Play {
        mount: "gdrive".to_string(),
        path: vec!["gd-movies".to_string()],
        target: target.to_string(),
        format: "json".to_string(),
        dry_run,
    }
}

#[test]
fn play_dry_run_json_contract_has_required_fields() {
    let temp_dir = TempDir::new().unwrap();
    let cli = CliContext::from_config(test_config(temp_dir.path())).unwrap();

    let output = cli.execute(&play("mov-3", true)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        parsed.get("target_application_id").and_then(|v| v.as_str()),
        Some("com.mxtech.videoplayer.ad")
    );
    assert_eq!(parsed.get("mime_type").and_then(|v| v.as_str()), Some("audio/x-mpegurl"));
    assert_eq!(parsed.get("strategy").and_then(|v| v.as_str()), Some("inline_playlist"));
    assert_eq!(parsed.get("item_count").and_then(|v| v.as_u64()), Some(3));
    assert_eq!(parsed.get("title").and_then(|v| v.as_str()), Some("Sintel (4K).mp4"));
    assert!(parsed
        .get("payload_locator")
        .and_then(|v| v.as_str())
        .map_or(false, |s| s.starts_with("data:audio/x-mpegurl;base64,")));
    assert!(parsed.get("auth_header").is_none());

    let history = cli
        .execute(&Commands::History {
            format: "json".to_string(),
            clear: false,
        })
        .unwrap();
    let entries: serde_json::Value = serde_json::from_str(&history).unwrap();
    assert_eq!(entries.as_array().map(Vec::len), Some(0));
}

#[test]
fn history_json_contract_uses_camel_case_fields() {
    let temp_dir = TempDir::new().unwrap();
    {
        let cli = CliContext::from_config(test_config(temp_dir.path())).unwrap();
        cli.execute(&play("mov-1", false)).unwrap();
        cli.execute(&play("Elephant Dreams.mp4", false)).unwrap();
    }

    let cli = CliContext::from_config(test_config(temp_dir.path())).unwrap();
    let output = cli
        .execute(&Commands::History {
            format: "json".to_string(),
            clear: false,
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let entries = parsed.as_array().expect("history should be an array");
    assert_eq!(entries.len(), 2);
    let newest = &entries[0];
    assert_eq!(newest.get("fileId").and_then(|v| v.as_str()), Some("mov-2"));
    assert_eq!(newest.get("fileName").and_then(|v| v.as_str()), Some("Elephant Dreams.mp4"));
    assert_eq!(newest.get("filePath").and_then(|v| v.as_str()), Some("gd-movies"));
    assert!(newest.get("timestamp").and_then(|v| v.as_i64()).is_some());
}

#[test]
fn ls_json_lists_containers_first() {
    let temp_dir = TempDir::new().unwrap();
    let cli = CliContext::from_config(test_config(temp_dir.path())).unwrap();
    let output = cli
        .execute(&Commands::Ls {
            mount: Some("local".to_string()),
            path: Vec::new(),
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let kinds: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|node| node.get("kind").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(kinds.first().copied(), Some("container"));
    assert_eq!(kinds.len(), 2);
}

#[test]
fn unknown_provider_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let cli = CliContext::from_config(test_config(temp_dir.path())).unwrap();
    let err = cli
        .execute(&Commands::Ls {
            mount: Some("ftp".to_string()),
            path: Vec::new(),
            format: "text".to_string(),
        })
        .unwrap_err();
    assert!(err.to_string().contains("ftp"));
}

#[test]
fn providers_json_reports_backends() {
    let temp_dir = TempDir::new().unwrap();
    let cli = CliContext::from_config(test_config(temp_dir.path())).unwrap();
    let output = cli
        .execute(&Commands::Providers {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 4);
    let local = items
        .iter()
        .find(|item| item.get("provider").and_then(|v| v.as_str()) == Some("local"))
        .expect("local provider should be registered");
    assert_eq!(local.get("backend").and_then(|v| v.as_str()), Some("static"));
}

#[test]
fn explicit_config_file_is_honored() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let config_path = temp_dir.path().join("streamtree.toml");
        fs::write(&config_path, test_config_toml(temp_dir.path())).unwrap();

        let cli = CliContext::new(Some(config_path)).unwrap();
        let output = cli.execute(&play("mov-2", true)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.get("title").and_then(|v| v.as_str()), Some("Elephant Dreams.mp4"));
    });
}
