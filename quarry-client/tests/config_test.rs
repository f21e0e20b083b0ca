//! Integration tests for client configuration files

use quarry::bulk::Refresh;
use quarry_client::ClientConfig;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Load / save
// ============================================================================

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("client.toml");

    let config = ClientConfig {
        default_index: Some("orders".to_string()),
        refresh: Some(Refresh::True),
        error_trace: true,
        track_total_hits: None,
    };
    config.save(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains(r#"default_index = "orders""#));
    assert!(content.contains(r#"refresh = "true""#));
    assert!(!content.contains("track_total_hits"));

    assert_eq!(ClientConfig::load(&path).unwrap(), config);
}

#[test]
fn test_load_or_default_without_file() {
    let dir = TempDir::new().unwrap();
    let config = ClientConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.toml");
    fs::write(&path, "track_total_hits = true\n").unwrap();

    let config = ClientConfig::load_or_default(&path).unwrap();
    assert_eq!(config.track_total_hits, Some(true));
    assert!(config.default_index.is_none());
    assert!(!config.error_trace);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_load_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let err = ClientConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read client config"));
}

#[test]
fn test_load_invalid_toml_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.toml");
    fs::write(&path, "default_index = [not toml").unwrap();

    let err = ClientConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("invalid client config"));
}
