//! Edge-list layout: flat entity and relationship collections.
//!
//! A neighborhood lookup collects the far endpoints of matching relationships
//! into `$ids` once, then selects those ids from `entities`.

use async_trait::async_trait;

use super::db::GraphDb;
use super::error::GraphError;
use super::loader::GraphBatch;
use super::models::{Entity, GraphStats};
use super::query::FilterRule;
use super::{GraphStore, Layout};
use crate::config::{ENTITIES_COLLECTION, RELATIONSHIPS_COLLECTION};

/// Store for the edge-list layout.
pub struct EdgeListStore {
    db: GraphDb,
}

impl EdgeListStore {
    pub fn new(db: GraphDb) -> Self {
        Self { db }
    }

    fn neighbor_query(rule: &FilterRule) -> String {
        let (anchor_end, far_end) = rule.direction.endpoints();
        format!(
            "LET $ids = (SELECT VALUE {far_end} FROM {relationships} \
              WHERE {anchor_end} = $anchor AND metaedge INSIDE $codes); \
             SELECT entity_id, name, kind FROM {entities} WHERE entity_id INSIDE $ids;",
            entities = ENTITIES_COLLECTION,
            relationships = RELATIONSHIPS_COLLECTION,
            far_end = far_end,
            anchor_end = anchor_end,
        )
    }
}

#[async_trait]
impl GraphStore for EdgeListStore {
    fn layout(&self) -> Layout {
        Layout::EdgeList
    }

    async fn initialize(&self) -> Result<(), GraphError> {
        // entity_id is not UNIQUE: reloading without a clear appends
        self.db
            .define(
                r#"
                DEFINE TABLE IF NOT EXISTS entities SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS entities_entity_id ON entities FIELDS entity_id;
                DEFINE INDEX IF NOT EXISTS entities_kind ON entities FIELDS kind;

                DEFINE TABLE IF NOT EXISTS relationships SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS relationships_source ON relationships FIELDS source;
                DEFINE INDEX IF NOT EXISTS relationships_target ON relationships FIELDS target;
                DEFINE INDEX IF NOT EXISTS relationships_metaedge ON relationships FIELDS metaedge;
                "#,
            )
            .await
    }

    async fn ping(&self) -> Result<(), GraphError> {
        self.db.ping().await
    }

    async fn insert_batch(&self, batch: GraphBatch) -> Result<(), GraphError> {
        match batch {
            GraphBatch::Entities(entities) => self.db.insert(ENTITIES_COLLECTION, entities).await,
            GraphBatch::Relationships(relationships) => {
                self.db.insert(RELATIONSHIPS_COLLECTION, relationships).await
            }
            GraphBatch::Embedded(_) => Err(GraphError::LayoutMismatch {
                store: Layout::EdgeList.as_str(),
                batch: Layout::Embedded.as_str(),
            }),
        }
    }

    async fn clear(&self) -> Result<(), GraphError> {
        self.db.delete_all(RELATIONSHIPS_COLLECTION).await?;
        self.db.delete_all(ENTITIES_COLLECTION).await
    }

    async fn clear_collection(&self, name: &str) -> Result<(), GraphError> {
        match name {
            ENTITIES_COLLECTION | RELATIONSHIPS_COLLECTION => self.db.delete_all(name).await,
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
        Ok(GraphStats {
            entities: self.db.count(ENTITIES_COLLECTION).await?,
            relationships: self.db.count(RELATIONSHIPS_COLLECTION).await?,
        })
    }
}
