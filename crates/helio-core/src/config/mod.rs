//! Configuration management for Helio.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `helio.toml` file
//! 3. User config `~/.config/helio/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::graph::{Layout, RetryPolicy};

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document store configuration.
    pub storage: StorageConfig,

    /// Bulk loader configuration.
    pub loader: LoaderConfig,

    /// Neighborhood query configuration.
    pub query: QueryConfig,

    /// Retry policy applied by callers around load and query.
    pub retry: RetryPolicy,

    /// Extra or overridden metaedge verbs, keyed by code.
    pub vocabulary: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./helio.toml` (project local)
    /// 2. `~/.config/helio/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("helio.toml").exists() {
            return Self::from_file("helio.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("helio").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Storage overrides
        if let Ok(path) = std::env::var("HELIO_DB_PATH") {
            self.storage.path = path;
        }
        if let Ok(engine) = std::env::var("HELIO_ENGINE") {
            if let Ok(engine) = engine.parse() {
                self.storage.engine = engine;
            }
        }
        if let Ok(ns) = std::env::var("HELIO_NAMESPACE") {
            self.storage.namespace = ns;
        }

        // Loader overrides
        if let Ok(layout) = std::env::var("HELIO_LAYOUT") {
            if let Ok(layout) = layout.parse() {
                self.loader.layout = layout;
            }
        }
        if let Ok(size) = std::env::var("HELIO_BATCH_SIZE") {
            if let Ok(n) = size.parse() {
                self.loader.batch_size = n;
            }
        }
        if let Ok(secs) = std::env::var("HELIO_LOAD_TIMEOUT_SECS") {
            if let Ok(n) = secs.parse() {
                self.loader.timeout_secs = Some(n);
            }
        }

        // Query overrides
        if let Ok(secs) = std::env::var("HELIO_QUERY_TIMEOUT_SECS") {
            if let Ok(n) = secs.parse() {
                self.query.timeout_secs = Some(n);
            }
        }
    }

    /// Reject values that would make the loader or retry hook misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loader.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "loader.batch_size must be at least 1".to_string(),
            ));
        }
        if self.retry.attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.attempts must be at least 1".to_string(),
            ));
        }
        if self.storage.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Which SurrealDB engine backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
    /// Persistent RocksDB files under `storage.path`.
    Rocksdb,
    /// In-process memory; contents vanish with the process.
    Memory,
}

impl std::str::FromStr for StorageEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rocksdb" => Ok(Self::Rocksdb),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid(format!("unknown storage engine: {}", other))),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Engine: "rocksdb" (default) or "memory".
    pub engine: StorageEngine,

    /// Database directory for the RocksDB engine.
    pub path: String,

    /// SurrealDB namespace. Each layout gets its own database inside it.
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            engine: DEFAULT_ENGINE.parse().unwrap_or(StorageEngine::Rocksdb),
            path: DEFAULT_DB_PATH.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Get the database path.
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    /// In-memory storage, mostly for tests.
    pub fn in_memory() -> Self {
        Self {
            engine: StorageEngine::Memory,
            ..Self::default()
        }
    }
}

/// Bulk loader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Layout written by `helio load` when none is given.
    pub layout: Layout,

    /// Documents per bulk insert. Affects throughput only.
    pub batch_size: usize,

    /// Upper bound on a whole load, in seconds. Unbounded when unset.
    pub timeout_secs: Option<u64>,

    /// Entity table path.
    pub nodes_file: String,

    /// Relationship table path.
    pub edges_file: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT.parse().unwrap_or(Layout::EdgeList),
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: None,
            nodes_file: DEFAULT_NODES_FILE.to_string(),
            edges_file: DEFAULT_EDGES_FILE.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Load timeout as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Neighborhood query configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Upper bound on one neighborhood query, in seconds. Unbounded when unset.
    pub timeout_secs: Option<u64>,
}

impl QueryConfig {
    /// Query timeout as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
