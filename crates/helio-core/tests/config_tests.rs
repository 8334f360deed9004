use helio_core::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_DB_PATH, DEFAULT_NAMESPACE, DEFAULT_NODES_FILE,
};
use helio_core::{Config, Layout, StorageEngine};

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.storage.path, DEFAULT_DB_PATH);
    assert_eq!(config.storage.namespace, DEFAULT_NAMESPACE);
    assert_eq!(config.storage.engine, StorageEngine::Rocksdb);
    assert_eq!(config.loader.layout, Layout::EdgeList);
    assert_eq!(config.loader.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(config.loader.nodes_file, DEFAULT_NODES_FILE);
    assert!(config.query.timeout().is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_to_toml() {
    let toml_str = Config::default_config_string();
    assert!(toml_str.contains("[storage]"));
    assert!(toml_str.contains("[loader]"));
    assert!(toml_str.contains("[retry]"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[storage]
engine = "memory"
namespace = "hetionet"

[loader]
layout = "embedded"
batch_size = 500
timeout_secs = 600

[query]
timeout_secs = 5

[retry]
attempts = 3
backoff_ms = 100

[vocabulary]
CxD = "contraindicates"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.storage.engine, StorageEngine::Memory);
    assert_eq!(config.storage.namespace, "hetionet");
    assert_eq!(config.storage.path, DEFAULT_DB_PATH);
    assert_eq!(config.loader.layout, Layout::Embedded);
    assert_eq!(config.loader.batch_size, 500);
    assert_eq!(config.loader.timeout().map(|d| d.as_secs()), Some(600));
    assert_eq!(config.query.timeout().map(|d| d.as_secs()), Some(5));
    assert_eq!(config.retry.attempts, 3);
    assert_eq!(
        config.vocabulary.get("CxD").map(String::as_str),
        Some("contraindicates")
    );
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("helio.toml");
    std::fs::write(&path, "[loader]\nbatch_size = 42\n").unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.loader.batch_size, 42);
}

#[test]
fn test_zero_batch_size_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("helio.toml");
    std::fs::write(&path, "[loader]\nbatch_size = 0\n").unwrap();

    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
