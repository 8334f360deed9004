//! Default values for Helio configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Storage Defaults
// ============================================================================

/// Default storage engine ("rocksdb" or "memory").
pub const DEFAULT_ENGINE: &str = "rocksdb";

/// Default on-disk database path.
pub const DEFAULT_DB_PATH: &str = ".helio/graph.db";

/// Default SurrealDB namespace.
pub const DEFAULT_NAMESPACE: &str = "helio";

/// Database holding the edge-list layout.
pub const EDGE_LIST_DATABASE: &str = "edge_list";

/// Database holding the embedded-adjacency layout.
pub const EMBEDDED_DATABASE: &str = "embedded";

// ============================================================================
// Collection Names
// ============================================================================

/// Entity collection (both layouts).
pub const ENTITIES_COLLECTION: &str = "entities";

/// Relationship collection (edge-list layout only).
pub const RELATIONSHIPS_COLLECTION: &str = "relationships";

// ============================================================================
// Loader Defaults
// ============================================================================

/// Default layout used when none is given.
pub const DEFAULT_LAYOUT: &str = "edge-list";

/// Rows written per bulk insert.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default entity table file name.
pub const DEFAULT_NODES_FILE: &str = "nodes.tsv";

/// Default relationship table file name.
pub const DEFAULT_EDGES_FILE: &str = "edges.tsv";

// ============================================================================
// Retry Defaults
// ============================================================================

/// Default number of attempts (1 means no retry).
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;

/// Default pause between attempts, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
