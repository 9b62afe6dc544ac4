//! # Path Finding
//!
//! Shortest-path resolution between families, layered:
//!
//! ```text
//! ParallelPathResolver ─┐
//!                       ├─> dyn PathFinder ─> CachedPathFinder ─> BidirectionalBfs ─> GraphStore
//! service ──────────────┘
//! ```
//!
//! Every path a finder returns is cycle-free and has
//! `degree == nodes.len() - 1`.

pub mod bfs;
pub mod cache;
pub mod parallel;

use async_trait::async_trait;
use crate::model::{ConnectionPath, FamilyId};
use crate::Result;

pub use bfs::{BidirectionalBfs, VERIFIED_STRENGTH_THRESHOLD};
pub use cache::{CachedPathEntry, CachedPathFinder, PathCache};
pub use parallel::{ParallelPathResolver, PathQuery, PathResult};

/// Resolves paths between two families.
///
/// "No path" is `Ok(None)` / an empty vec, never an error. Errors mean
/// the store could not be read.
#[async_trait]
pub trait PathFinder: Send + Sync + 'static {
    /// One shortest path of at most `max_depth` hops.
    async fn find_path(
        &self,
        from: &FamilyId,
        to: &FamilyId,
        max_depth: usize,
    ) -> Result<Option<ConnectionPath>>;

    /// Up to `max_paths` distinct paths of at most `max_depth` hops,
    /// shortest first.
    async fn find_multiple_paths(
        &self,
        from: &FamilyId,
        to: &FamilyId,
        max_depth: usize,
        max_paths: usize,
    ) -> Result<Vec<ConnectionPath>>;
}
