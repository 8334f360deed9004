//! Bounded waits and the caller-side retry hook.
//!
//! The core never retries on its own. Callers that want retries wrap an
//! operation with [`retry`]; only errors that report
//! [`GraphError::is_retryable`] are tried again.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::error::GraphError;
use crate::config::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_MS};

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first. 1 disables retries.
    pub attempts: u32,

    /// Fixed pause between attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts,
            backoff_ms: backoff.as_millis() as u64,
        }
    }

    /// Single attempt.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Run `op`, trying again on retryable errors as `policy` allows.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, GraphError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GraphError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Err(err) if err.is_retryable() && attempt < attempts => {
                warn!(attempt, attempts, "retrying after error: {}", err);
                tokio::time::sleep(policy.backoff()).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Await `fut`, failing with [`GraphError::Timeout`] once `limit` passes.
pub async fn with_timeout<T>(
    operation: &'static str,
    limit: Option<Duration>,
    fut: impl Future<Output = Result<T, GraphError>>,
) -> Result<T, GraphError> {
    match limit {
        None => fut.await,
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| GraphError::Timeout { operation, after })?,
    }
}
