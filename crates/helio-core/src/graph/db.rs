//! SurrealDB embedded database shared by both storage layouts.

use serde::Serialize;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

use super::error::GraphError;
use super::models::Entity;
use super::Layout;
use crate::config::{StorageConfig, StorageEngine};

/// Database connection scoped to one layout's database.
pub struct GraphDb {
    db: Surreal<Db>,
}

impl GraphDb {
    /// Open or create the database for `layout` as configured.
    pub async fn open(config: &StorageConfig, layout: Layout) -> Result<Self, GraphError> {
        let db = match config.engine {
            StorageEngine::Rocksdb => {
                let path = config.db_path();
                Surreal::new::<RocksDb>(path.as_path()).await
            }
            StorageEngine::Memory => Surreal::new::<Mem>(()).await,
        }
        .map_err(|e| GraphError::Connection(e.to_string()))?;

        db.use_ns(config.namespace.as_str())
            .use_db(layout.database_name())
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Confirm the engine answers.
    pub async fn ping(&self) -> Result<(), GraphError> {
        self.db
            .health()
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))
    }

    /// Run schema statements, surfacing the first statement error.
    pub async fn define(&self, statements: &str) -> Result<(), GraphError> {
        self.db.query(statements).await?.check()?;
        Ok(())
    }

    /// Bulk insert documents into `table`.
    pub async fn insert<T>(&self, table: &str, documents: Vec<T>) -> Result<(), GraphError>
    where
        T: Serialize + Send + 'static,
    {
        if documents.is_empty() {
            return Ok(());
        }
        self.db
            .query(format!("INSERT INTO {} $documents", table))
            .bind(("documents", documents))
            .await?
            .check()?;
        Ok(())
    }

    /// Delete every record in `table`.
    pub async fn delete_all(&self, table: &str) -> Result<(), GraphError> {
        self.db.query(format!("DELETE {}", table)).await?.check()?;
        Ok(())
    }

    /// Count records in `table`.
    pub async fn count(&self, table: &str) -> Result<usize, GraphError> {
        // SurrealDB returns count as { count: N }
        #[derive(serde::Deserialize)]
        struct CountResult {
            count: i64,
        }

        let result: Option<CountResult> = self
            .db
            .query(format!("SELECT count() FROM {} GROUP ALL", table))
            .await?
            .take(0)?;

        Ok(result.map(|r| r.count as usize).unwrap_or(0))
    }

    /// Find an entity document by its identifier.
    pub async fn find_entity(&self, table: &str, entity_id: &str) -> Result<Option<Entity>, GraphError> {
        let entity: Option<Entity> = self
            .db
            .query(format!(
                "SELECT entity_id, name, kind FROM {} WHERE entity_id = $id LIMIT 1",
                table
            ))
            .bind(("id", entity_id.to_string()))
            .await?
            .take(0)?;
        Ok(entity)
    }

    /// Run a query binding `$anchor` and `$codes`, returning the entities
    /// selected by its last statement.
    pub async fn select_entities(
        &self,
        query: &str,
        anchor: &str,
        codes: &[String],
    ) -> Result<Vec<Entity>, GraphError> {
        let mut response = self
            .db
            .query(query)
            .bind(("anchor", anchor.to_string()))
            .bind(("codes", codes.to_vec()))
            .await?
            .check()?;
        let last = response.num_statements().saturating_sub(1);
        let entities: Vec<Entity> = response.take(last)?;
        Ok(entities)
    }

    /// Evaluate a query whose single statement returns a number.
    pub async fn scalar(&self, query: &str) -> Result<usize, GraphError> {
        let value: Option<i64> = self.db.query(query).await?.take(0)?;
        Ok(value.unwrap_or(0).max(0) as usize)
    }
}
