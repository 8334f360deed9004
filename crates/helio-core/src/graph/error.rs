//! Knowledge graph error types.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading or querying the graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The document store could not be reached or opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Database query error.
    #[error("Database error: {0}")]
    Database(String),

    /// IO error.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Anchor entity not present in the store.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Metaedge code missing from the vocabulary.
    #[error("Unknown metaedge code: {0}")]
    UnknownMetaEdge(String),

    /// A filter set that cannot match anything.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Collection name not used by the active layout.
    #[error("Unknown collection for this layout: {0}")]
    UnknownCollection(String),

    /// Documents of one layout handed to a store of the other.
    #[error("Layout mismatch: {store} store cannot hold {batch} documents")]
    LayoutMismatch { store: &'static str, batch: &'static str },

    /// Operation exceeded its configured bound.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl GraphError {
    /// Create an IO error tied to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GraphError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether trying the same operation again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GraphError::Connection(_) | GraphError::Timeout { .. })
    }
}

impl From<surrealdb::Error> for GraphError {
    fn from(err: surrealdb::Error) -> Self {
        GraphError::Database(err.to_string())
    }
}
