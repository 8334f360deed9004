//! Helio core: load a biomedical knowledge graph into SurrealDB and answer
//! one-hop neighborhood questions about it.

pub mod config;
pub mod graph;

pub use config::{Config, ConfigError, LoaderConfig, QueryConfig, StorageConfig, StorageEngine};
pub use graph::{
    open_store, Category, Entity, GraphError, GraphLoader, GraphStore, Layout, LoadReport,
    Neighborhood, NeighborhoodFilters, QueryEngine, Relationship, RetryPolicy, Vocabulary,
};
