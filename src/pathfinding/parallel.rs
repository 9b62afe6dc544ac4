//! Bounded-concurrency batch resolution.
//!
//! One task per query, at most `max_workers` of them past the semaphore
//! at any time. Each task owns its output slot, so results need no lock.
//! A failing query never cancels its siblings.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::model::{ConnectionPath, FamilyId};
use crate::{Error, Result};
use super::PathFinder;

/// Default worker count for batch resolution.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// One path lookup in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathQuery {
    pub from: FamilyId,
    pub to: FamilyId,
    pub max_depth: usize,
}

impl PathQuery {
    pub fn new(from: impl Into<FamilyId>, to: impl Into<FamilyId>, max_depth: usize) -> Self {
        Self { from: from.into(), to: to.into(), max_depth }
    }
}

/// Outcome of one [`PathQuery`]. `path` and `error` are never both set.
#[derive(Debug, Clone)]
pub struct PathResult {
    pub query: PathQuery,
    pub path: Option<ConnectionPath>,
    pub error: Option<Error>,
}

impl PathResult {
    fn from_outcome(query: PathQuery, outcome: Result<Option<ConnectionPath>>) -> Self {
        match outcome {
            Ok(path) => Self { query, path, error: None },
            Err(e) => Self { query, path: None, error: Some(e) },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// Fans independent queries out over a shared [`PathFinder`].
#[derive(Clone)]
pub struct ParallelPathResolver {
    finder: Arc<dyn PathFinder>,
    max_workers: usize,
}

impl ParallelPathResolver {
    pub fn new(finder: Arc<dyn PathFinder>, max_workers: usize) -> Self {
        Self { finder, max_workers: max_workers.max(1) }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Resolve every query; `result[i]` answers `queries[i]`.
    ///
    /// Waits for all tasks. Must run inside a tokio runtime.
    pub async fn resolve_batch(&self, queries: Vec<PathQuery>) -> Vec<PathResult> {
        if queries.is_empty() {
            return Vec::new();
        }
        debug!(queries = queries.len(), workers = self.max_workers, "resolving batch");

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let handles: Vec<_> = queries
            .iter()
            .cloned()
            .map(|query| {
                let finder = Arc::clone(&self.finder);
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| Error::Task(format!("worker semaphore closed: {e}")))?;
                    finder.find_path(&query.from, &query.to, query.max_depth).await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(queries.len());
        for (query, handle) in queries.into_iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join) => Err(Error::Task(format!(
                    "path query {} -> {} did not complete: {join}",
                    query.from, query.to
                ))),
            };
            results.push(PathResult::from_outcome(query, outcome));
        }
        results
    }
}

// ============================================================================
// Tests
// ============================================================================
