//! Biomedical knowledge graph: loading and one-hop neighborhood queries.
//!
//! The graph (compounds, diseases, genes, anatomy terms and typed
//! relationships between them) is stored in SurrealDB in one of two layouts:
//!
//! - **Edge-list** ([`EdgeListStore`]) - `entities` and `relationships`
//!   collections, joined at query time
//! - **Embedded adjacency** ([`EmbeddedStore`]) - one `entities` collection
//!   whose documents carry their own `edges_out` / `edges_in` lists
//!
//! # Components
//!
//! - [`Vocabulary`] - metaedge code to verb lookup
//! - [`reader`] - TSV table reader
//! - [`GraphLoader`] - builds layout documents and bulk-writes them
//! - [`GraphStore`] - layout-specific storage, chosen at construction time
//! - [`QueryEngine`] - `neighborhood(anchor, filters)` over any store
//!
//! # Example
//!
//! ```ignore
//! use helio_core::graph::{open_store, GraphLoader, Layout, NeighborhoodFilters, QueryEngine};
//!
//! let store = open_store(&config.storage, Layout::Embedded).await?;
//! GraphLoader::new(vocabulary.clone()).load_tables(store.as_ref(), nodes, edges).await?;
//!
//! let engine = QueryEngine::new(store, vocabulary);
//! let hood = engine.neighborhood("Disease::DOID:0050425", &NeighborhoodFilters::default()).await?;
//! ```

mod db;
mod edge_list;
mod embedded;
mod error;
mod loader;
mod models;
mod query;
pub mod reader;
mod retry;
mod vocabulary;

pub use db::GraphDb;
pub use edge_list::EdgeListStore;
pub use embedded::EmbeddedStore;
pub use error::GraphError;
pub use loader::{BuildSummary, GraphBatch, GraphBuild, GraphLoader, LoadReport};
pub use models::{Category, EmbeddedEntity, Entity, GraphStats, InEdge, OutEdge, Relationship};
pub use query::{Direction, FilterRule, Neighborhood, NeighborhoodFilters, QueryEngine};
pub use retry::{retry, with_timeout, RetryPolicy};
pub use vocabulary::{MetaEdge, Vocabulary, HETIONET_METAEDGES};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::{StorageConfig, EDGE_LIST_DATABASE, EMBEDDED_DATABASE};

/// Physical layout of the graph in the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Separate entity and relationship collections.
    EdgeList,
    /// Entities with embedded incoming/outgoing adjacency.
    Embedded,
}

impl Layout {
    /// SurrealDB database holding this layout.
    pub fn database_name(&self) -> &'static str {
        match self {
            Self::EdgeList => EDGE_LIST_DATABASE,
            Self::Embedded => EMBEDDED_DATABASE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EdgeList => "edge-list",
            Self::Embedded => "embedded",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "edge-list" | "edge_list" | "edges" => Ok(Self::EdgeList),
            "embedded" | "adjacency" => Ok(Self::Embedded),
            other => Err(format!("unknown layout: {}", other)),
        }
    }
}

/// Storage for one layout of the graph.
///
/// Both implementations answer [`GraphStore::candidates`] for the same
/// logical graph with the same entities; [`QueryEngine`] does the rest.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Layout this store writes and reads.
    fn layout(&self) -> Layout;

    /// Define tables and indexes. Safe to call on every open.
    async fn initialize(&self) -> Result<(), GraphError>;

    /// Confirm the store is reachable.
    async fn ping(&self) -> Result<(), GraphError>;

    /// Write one batch of layout documents.
    async fn insert_batch(&self, batch: GraphBatch) -> Result<(), GraphError>;

    /// Delete every record in every collection of this layout.
    async fn clear(&self) -> Result<(), GraphError>;

    /// Delete every record in one named collection.
    async fn clear_collection(&self, name: &str) -> Result<(), GraphError>;

    /// Look up an entity by identifier.
    async fn get_entity(&self, entity_id: &str) -> Result<Option<Entity>, GraphError>;

    /// Entities one relationship away from `anchor` matching `rule`'s
    /// direction and codes. Not filtered by category.
    async fn candidates(&self, anchor: &str, rule: &FilterRule) -> Result<Vec<Entity>, GraphError>;

    /// Record counts.
    async fn stats(&self) -> Result<GraphStats, GraphError>;
}

/// Open the configured database for `layout` and initialize its schema.
pub async fn open_store(
    config: &StorageConfig,
    layout: Layout,
) -> Result<Arc<dyn GraphStore>, GraphError> {
    let db = GraphDb::open(config, layout).await?;
    let store: Arc<dyn GraphStore> = match layout {
        Layout::EdgeList => Arc::new(EdgeListStore::new(db)),
        Layout::Embedded => Arc::new(EmbeddedStore::new(db)),
    };
    store.initialize().await?;
    Ok(store)
}

/// Fresh in-memory store for `layout`.
pub async fn memory_store(layout: Layout) -> Result<Arc<dyn GraphStore>, GraphError> {
    open_store(&StorageConfig::in_memory(), layout).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_str() {
        assert_eq!("edge-list".parse::<Layout>().unwrap(), Layout::EdgeList);
        assert_eq!("Embedded".parse::<Layout>().unwrap(), Layout::Embedded);
        assert!("matrix".parse::<Layout>().is_err());
    }

    #[test]
    fn test_layout_databases_differ() {
        assert_ne!(
            Layout::EdgeList.database_name(),
            Layout::Embedded.database_name()
        );
    }
}
