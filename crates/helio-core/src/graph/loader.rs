//! Bulk loader: turns entity and relationship rows into layout documents
//! and writes them in batches.
//!
//! Relationships naming an entity id absent from the same load's entity rows
//! are rejected (counted, logged) and the load carries on. Both layouts apply
//! the same rejections so they always hold the same logical graph.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::GraphError;
use super::models::{EmbeddedEntity, Entity, InEdge, OutEdge, Relationship};
use super::reader::{read_entities_from_path, read_relationships_from_path};
use super::retry::{retry, with_timeout, RetryPolicy};
use super::vocabulary::Vocabulary;
use super::{GraphStore, Layout};
use crate::config::DEFAULT_BATCH_SIZE;

/// Documents ready to be written, in the shape of one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphBuild {
    EdgeList {
        entities: Vec<Entity>,
        relationships: Vec<Relationship>,
    },
    Embedded {
        entities: Vec<EmbeddedEntity>,
    },
}

impl GraphBuild {
    /// Split into insert batches of at most `batch_size` documents,
    /// entities first.
    pub fn into_batches(self, batch_size: usize) -> Vec<GraphBatch> {
        let size = batch_size.max(1);
        match self {
            Self::EdgeList {
                entities,
                relationships,
            } => chunked(entities, size)
                .into_iter()
                .map(GraphBatch::Entities)
                .chain(
                    chunked(relationships, size)
                        .into_iter()
                        .map(GraphBatch::Relationships),
                )
                .collect(),
            Self::Embedded { entities } => chunked(entities, size)
                .into_iter()
                .map(GraphBatch::Embedded)
                .collect(),
        }
    }
}

/// One bulk insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphBatch {
    Entities(Vec<Entity>),
    Relationships(Vec<Relationship>),
    Embedded(Vec<EmbeddedEntity>),
}

impl GraphBatch {
    pub fn len(&self) -> usize {
        match self {
            Self::Entities(v) => v.len(),
            Self::Relationships(v) => v.len(),
            Self::Embedded(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn chunked<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut chunks = Vec::new();
    let mut iter = items.into_iter();
    loop {
        let chunk: Vec<T> = iter.by_ref().take(size).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }
    chunks
}

/// Outcome of a load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub layout: Layout,
    /// Entity documents written.
    pub entities: usize,
    /// Relationships written (as documents or as adjacency pairs).
    pub relationships: usize,
    /// Malformed table rows rejected by the reader.
    pub rejected_rows: usize,
    /// Relationships rejected for naming an unknown entity.
    pub dangling: usize,
    /// Entity rows dropped because their id was already seen.
    pub duplicate_entities: usize,
    /// Relationships whose code is not in the vocabulary (still loaded).
    pub unknown_metaedges: usize,
    /// Bulk inserts issued.
    pub batches: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layout:             {}", self.layout)?;
        writeln!(f, "Entities:           {}", self.entities)?;
        writeln!(f, "Relationships:      {}", self.relationships)?;
        writeln!(f, "Rejected rows:      {}", self.rejected_rows)?;
        writeln!(f, "Dangling refs:      {}", self.dangling)?;
        writeln!(f, "Duplicate entities: {}", self.duplicate_entities)?;
        writeln!(f, "Unknown metaedges:  {}", self.unknown_metaedges)?;
        writeln!(f, "Batches:            {}", self.batches)?;
        write!(
            f,
            "Elapsed:            {:.2}s",
            (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
        )
    }
}

/// Counts collected while building documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub entities: usize,
    pub relationships: usize,
    pub dangling: usize,
    pub duplicate_entities: usize,
    pub unknown_metaedges: usize,
}

/// Builds layout documents and writes them through a [`GraphStore`].
#[derive(Debug, Clone)]
pub struct GraphLoader {
    vocabulary: Arc<Vocabulary>,
    batch_size: usize,
    timeout: Option<Duration>,
}

impl GraphLoader {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            vocabulary,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: None,
        }
    }

    /// Documents per insert. Values below 1 are treated as 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Bound the write phase of a load; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shape rows into documents for `layout`.
    pub fn build(
        &self,
        layout: Layout,
        entities: Vec<Entity>,
        relationships: Vec<Relationship>,
    ) -> (GraphBuild, BuildSummary) {
        let mut summary = BuildSummary::default();

        // First row per id wins, in input order
        let mut index: HashMap<String, usize> = HashMap::with_capacity(entities.len());
        let mut kept: Vec<Entity> = Vec::with_capacity(entities.len());
        for entity in entities {
            if index.contains_key(&entity.entity_id) {
                warn!(entity = %entity.entity_id, "duplicate entity id, keeping first row");
                summary.duplicate_entities += 1;
                continue;
            }
            index.insert(entity.entity_id.clone(), kept.len());
            kept.push(entity);
        }

        let mut unknown_codes: HashSet<String> = HashSet::new();
        let mut valid: Vec<Relationship> = Vec::with_capacity(relationships.len());
        for rel in relationships {
            if !index.contains_key(&rel.source) || !index.contains_key(&rel.target) {
                warn!(
                    relationship = %rel.describe(&self.vocabulary),
                    "dangling reference, rejecting relationship"
                );
                summary.dangling += 1;
                continue;
            }
            if !self.vocabulary.contains(&rel.metaedge) {
                if unknown_codes.insert(rel.metaedge.clone()) {
                    warn!(metaedge = %rel.metaedge, "metaedge code not in vocabulary");
                }
                summary.unknown_metaedges += 1;
            }
            valid.push(rel);
        }

        summary.entities = kept.len();
        summary.relationships = valid.len();

        let build = match layout {
            Layout::EdgeList => GraphBuild::EdgeList {
                entities: kept,
                relationships: valid,
            },
            Layout::Embedded => {
                let mut documents: Vec<EmbeddedEntity> =
                    kept.into_iter().map(EmbeddedEntity::from).collect();
                for rel in valid {
                    // Endpoints were checked above
                    let (source, target) = (index[&rel.source], index[&rel.target]);
                    documents[source].edges_out.push(OutEdge {
                        target: rel.target.clone(),
                        metaedge: rel.metaedge.clone(),
                    });
                    documents[target].edges_in.push(InEdge {
                        source: rel.source,
                        metaedge: rel.metaedge,
                    });
                }
                GraphBuild::Embedded {
                    entities: documents,
                }
            }
        };

        (build, summary)
    }

    /// Build documents for `store`'s layout and write them.
    ///
    /// Appends to whatever the store already holds. A failure partway leaves
    /// the batches written so far in place; recover with [`Self::clear`] and
    /// a fresh load.
    pub async fn load(
        &self,
        store: &dyn GraphStore,
        entities: Vec<Entity>,
        relationships: Vec<Relationship>,
    ) -> Result<LoadReport, GraphError> {
        let started_at = Utc::now();
        let layout = store.layout();
        info!(
            %layout,
            entities = entities.len(),
            relationships = relationships.len(),
            "building graph documents"
        );

        let (build, summary) = self.build(layout, entities, relationships);
        let batches = build.into_batches(self.batch_size);
        let batch_count = batches.len();

        with_timeout("load", self.timeout, async {
            for (i, batch) in batches.into_iter().enumerate() {
                debug!(batch = i + 1, of = batch_count, documents = batch.len(), "inserting batch");
                store.insert_batch(batch).await?;
            }
            Ok::<(), GraphError>(())
        })
        .await?;

        let report = LoadReport {
            layout,
            entities: summary.entities,
            relationships: summary.relationships,
            rejected_rows: 0,
            dangling: summary.dangling,
            duplicate_entities: summary.duplicate_entities,
            unknown_metaedges: summary.unknown_metaedges,
            batches: batch_count,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            %layout,
            entities = report.entities,
            relationships = report.relationships,
            dangling = report.dangling,
            "load complete"
        );
        Ok(report)
    }

    /// Read both TSV tables and load them.
    pub async fn load_tables(
        &self,
        store: &dyn GraphStore,
        nodes: &Path,
        edges: &Path,
    ) -> Result<LoadReport, GraphError> {
        let entities = read_entities_from_path(nodes)?;
        let relationships = read_relationships_from_path(edges)?;
        let rejected = entities.rejected + relationships.rejected;
        if rejected > 0 {
            warn!(rejected, "malformed rows rejected while reading tables");
        }

        let mut report = self.load(store, entities.rows, relationships.rows).await?;
        report.rejected_rows = rejected;
        Ok(report)
    }

    /// Load both tables, retrying as `policy` allows.
    ///
    /// With `clear_first` every attempt starts by clearing the store, so a
    /// retry never lands on the batches a failed attempt already wrote.
    /// Without it the load appends to existing data and runs once.
    pub async fn load_tables_with_retry(
        &self,
        store: &dyn GraphStore,
        nodes: &Path,
        edges: &Path,
        policy: &RetryPolicy,
        clear_first: bool,
    ) -> Result<LoadReport, GraphError> {
        let single = RetryPolicy::none();
        let policy = if clear_first {
            policy
        } else {
            if policy.attempts > 1 {
                warn!("appending load is not retried; pass clear to enable retries");
            }
            &single
        };

        retry(policy, move || async move {
            if clear_first {
                self.clear(store).await?;
            }
            self.load_tables(store, nodes, edges).await
        })
        .await
    }

    /// Remove everything the store's layout holds, ahead of a reload.
    pub async fn clear(&self, store: &dyn GraphStore) -> Result<(), GraphError> {
        info!(layout = %store.layout(), "clearing collections");
        store.clear().await
    }
}
