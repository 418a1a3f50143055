/*!
 * Tests for configuration loading, overrides and validation
 */

use std::collections::HashMap;
use tempfile::TempDir;

use mindmosaic::app_config::{Config, LogLevel};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.server.port, Config::default().server.port);
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.admin.email, config.admin.email);
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{ "server": { "port": 9000 }, "log_level": "debug" }"#).unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, Config::default().server.host);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.database.explicit_path().is_none());
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, "{ not json").unwrap();

    let error = Config::load_or_create(&path).unwrap_err();
    assert!(error.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_applyOverrides_shouldUseNonEmptyValues() {
    let mut config = Config::default();
    config.apply_overrides(lookup(&[
        ("REPLICATE_API_TOKEN", "r8_token"),
        ("TOGETHER_API_KEY", "   "),
        ("ADMIN_EMAIL", "ops@example.edu"),
        ("MINDMOSAIC_PORT", "4100"),
        ("MINDMOSAIC_DB", "/tmp/mosaic.db"),
    ]));

    assert_eq!(config.emotion.api_token, "r8_token");
    assert!(config.generation.api_key.is_empty());
    assert_eq!(config.admin.email, "ops@example.edu");
    assert_eq!(config.server.port, 4100);
    assert_eq!(config.database.explicit_path().unwrap().to_str(), Some("/tmp/mosaic.db"));
}

#[test]
fn test_applyOverrides_withInvalidPort_shouldKeepConfiguredPort() {
    let mut config = Config::default();
    let port = config.server.port;
    config.apply_overrides(lookup(&[("MINDMOSAIC_PORT", "eighty")]));
    assert_eq!(config.server.port, port);
}

#[test]
fn test_validate_withDefaults_shouldPass() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_withBadValues_shouldFail() {
    let mut config = Config::default();
    config.generation.temperature = 3.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.emotion.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.admin.password = String::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.server.port = 0;
    assert!(config.validate().is_err());
}
