//! Embedded-adjacency layout: each entity carries its own edge lists.
//!
//! No join at query time. A neighbor is any entity whose `edges_out` (or
//! `edges_in`) holds an entry pointing back at the anchor with a matching
//! code.

use async_trait::async_trait;

use super::db::GraphDb;
use super::error::GraphError;
use super::loader::GraphBatch;
use super::models::{Entity, GraphStats};
use super::query::{Direction, FilterRule};
use super::{GraphStore, Layout};
use crate::config::ENTITIES_COLLECTION;

/// Store for the embedded-adjacency layout.
pub struct EmbeddedStore {
    db: GraphDb,
}

impl EmbeddedStore {
    pub fn new(db: GraphDb) -> Self {
        Self { db }
    }

    fn neighbor_query(rule: &FilterRule) -> String {
        // The neighbor's own list points back at the anchor: a compound that
        // treats the anchor has it as an `edges_out` target.
        let (list, anchor_end) = match rule.direction {
            Direction::Incoming => ("edges_out", "target"),
            Direction::Outgoing => ("edges_in", "source"),
        };
        format!(
            "SELECT entity_id, name, kind FROM {entities} \
             WHERE array::len({list}[WHERE {anchor_end} = $anchor AND metaedge INSIDE $codes]) > 0",
            entities = ENTITIES_COLLECTION,
            list = list,
            anchor_end = anchor_end,
        )
    }
}

#[async_trait]
impl GraphStore for EmbeddedStore {
    fn layout(&self) -> Layout {
        Layout::Embedded
    }

    async fn initialize(&self) -> Result<(), GraphError> {
        self.db
            .define(
                r#"
                DEFINE TABLE IF NOT EXISTS entities SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS entities_entity_id ON entities FIELDS entity_id;
                DEFINE INDEX IF NOT EXISTS entities_kind ON entities FIELDS kind;
                "#,
            )
            .await
    }

    async fn ping(&self) -> Result<(), GraphError> {
        self.db.ping().await
    }

    async fn insert_batch(&self, batch: GraphBatch) -> Result<(), GraphError> {
        match batch {
            GraphBatch::Embedded(entities) => self.db.insert(ENTITIES_COLLECTION, entities).await,
            GraphBatch::Entities(_) | GraphBatch::Relationships(_) => {
                Err(GraphError::LayoutMismatch {
                    store: Layout::Embedded.as_str(),
                    batch: Layout::EdgeList.as_str(),
                })
            }
        }
    }

    async fn clear(&self) -> Result<(), GraphError> {
        self.db.delete_all(ENTITIES_COLLECTION).await
    }

    async fn clear_collection(&self, name: &str) -> Result<(), GraphError> {
        match name {
            ENTITIES_COLLECTION => self.db.delete_all(name).await,
            other => Err(GraphError::UnknownCollection(other.to_string())),
        }
    }

    async fn get_entity(&self, entity_id: &str) -> Result<Option<Entity>, GraphError> {
        self.db.find_entity(ENTITIES_COLLECTION, entity_id).await
    }

    async fn candidates(&self, anchor: &str, rule: &FilterRule) -> Result<Vec<Entity>, GraphError> {
        let query = Self::neighbor_query(rule);
        self.db.select_entities(&query, anchor, &rule.metaedges).await
    }

    async fn stats(&self) -> Result<GraphStats, GraphError> {
        let relationships = self
            .db
            .scalar(&format!(
                "RETURN math::sum((SELECT VALUE array::len(edges_out) FROM {}))",
                ENTITIES_COLLECTION
            ))
            .await?;

        Ok(GraphStats {
            entities: self.db.count(ENTITIES_COLLECTION).await?,
            relationships,
        })
    }
}
