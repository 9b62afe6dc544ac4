//! # Connection Resolution Service
//!
//! The orchestration layer callers talk to. Validates identifiers, clamps
//! depth and count parameters to their accepted ranges, and composes the
//! path finder into the aggregate queries:
//!
//! | Operation | Depth range | Default |
//! |-----------|-------------|---------|
//! | `find_shortest_path` | 1..=6 | 4 |
//! | `find_multiple_paths` | 1..=6, paths 1..=10 | 4, 3 |
//! | `get_family_network` | 1..=4 | 2 |
//! | `find_common_connections` | 1..=4 | 2 |
//! | `find_eligible_matches` | 1..=4 | 2 |
//!
//! Out-of-range values fall back to the default rather than erroring.
//! Aggregate operations skip candidates whose path lookup fails; the
//! aggregate call itself only fails when its initial store read does.

pub mod trust;

use std::sync::Arc;
use chrono::Utc;
use hashbrown::HashSet;
use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::matching::MatchScorer;
use crate::model::*;
use crate::pathfinding::{
    BidirectionalBfs, CachedPathFinder, ParallelPathResolver, PathCache, PathFinder, PathQuery, PathResult,
};
use crate::storage::GraphStore;
use crate::{Error, Result};

pub use trust::TrustRecomputation;

pub const MAX_PATH_DEPTH: usize = 6;
pub const DEFAULT_PATH_DEPTH: usize = 4;
pub const MAX_PATHS: usize = 10;
pub const DEFAULT_MAX_PATHS: usize = 3;
pub const MAX_NETWORK_DEGREE: usize = 4;
pub const DEFAULT_NETWORK_DEGREE: usize = 2;

/// `value` if it lies in `1..=max`, otherwise `default`.
fn in_range_or(value: Option<usize>, max: usize, default: usize) -> usize {
    match value {
        Some(v) if (1..=max).contains(&v) => v,
        _ => default,
    }
}

fn require_id(id: &FamilyId, what: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::Validation(format!("{what} family ID is required")));
    }
    Ok(())
}

// ============================================================================
// Service
// ============================================================================

/// Entry point for connection queries over one [`GraphStore`].
pub struct ConnectionResolutionService<S: GraphStore> {
    store: Arc<S>,
    finder: Arc<dyn PathFinder>,
    resolver: ParallelPathResolver,
    scorer: MatchScorer,
    config: ResolverConfig,
}

impl<S: GraphStore> ConnectionResolutionService<S> {
    /// Service with default configuration: cached BFS, eight batch workers.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, ResolverConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: ResolverConfig) -> Self {
        let bfs = BidirectionalBfs::new(Arc::clone(&store));
        let finder: Arc<dyn PathFinder> = if config.cache_enabled {
            let cache = PathCache::with_capacity(config.cache_ttl(), config.cache_capacity);
            Arc::new(CachedPathFinder::with_cache(bfs, cache))
        } else {
            Arc::new(bfs)
        };
        Self::with_finder(store, finder, config)
    }

    /// Use a caller-supplied finder instead of building one from `config`.
    pub fn with_finder(store: Arc<S>, finder: Arc<dyn PathFinder>, config: ResolverConfig) -> Self {
        let resolver = ParallelPathResolver::new(Arc::clone(&finder), config.max_workers);
        Self { store, finder, resolver, scorer: MatchScorer::new(), config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn finder(&self) -> &Arc<dyn PathFinder> {
        &self.finder
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// Shortest path between two families, `Ok(None)` if there is none
    /// within `max_depth` hops.
    pub async fn find_shortest_path(
        &self,
        from: &FamilyId,
        to: &FamilyId,
        max_depth: Option<usize>,
    ) -> Result<Option<ConnectionPath>> {
        require_id(from, "source")?;
        require_id(to, "target")?;
        let depth = in_range_or(max_depth, MAX_PATH_DEPTH, self.config.default_max_depth);

        let path = self.finder.find_path(from, to, depth).await?;
        match &path {
            Some(p) => debug!(%from, %to, degree = p.degree, strength = p.path_strength, "path found"),
            None => debug!(%from, %to, depth, "no path"),
        }
        Ok(path)
    }

    /// Up to `max_paths` distinct paths, shortest first.
    pub async fn find_multiple_paths(
        &self,
        from: &FamilyId,
        to: &FamilyId,
        max_depth: Option<usize>,
        max_paths: Option<usize>,
    ) -> Result<Vec<ConnectionPath>> {
        require_id(from, "source")?;
        require_id(to, "target")?;
        let depth = in_range_or(max_depth, MAX_PATH_DEPTH, self.config.default_max_depth);
        let limit = in_range_or(max_paths, MAX_PATHS, DEFAULT_MAX_PATHS);

        let paths = self.finder.find_multiple_paths(from, to, depth, limit).await?;
        debug!(%from, %to, found = paths.len(), "multiple paths resolved");
        Ok(paths)
    }

    /// Resolve many independent queries concurrently.
    ///
    /// Output order matches input order. `max_workers` overrides the
    /// configured worker count for this batch only.
    pub async fn resolve_batch(&self, queries: Vec<PathQuery>, max_workers: Option<usize>) -> Vec<PathResult> {
        let queries: Vec<PathQuery> = queries
            .into_iter()
            .map(|mut q| {
                q.max_depth = in_range_or(Some(q.max_depth), MAX_PATH_DEPTH, self.config.default_max_depth);
                q
            })
            .collect();

        match max_workers {
            Some(workers) if workers != self.resolver.max_workers() => {
                ParallelPathResolver::new(Arc::clone(&self.finder), workers).resolve_batch(queries).await
            }
            _ => self.resolver.resolve_batch(queries).await,
        }
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Families within `degree` hops of `anchor`, bucketed by the degree of
    /// their shortest path.
    pub async fn get_family_network(&self, anchor: &FamilyId, degree: Option<usize>) -> Result<FamilyNetwork> {
        require_id(anchor, "anchor")?;
        let degree = in_range_or(degree, MAX_NETWORK_DEGREE, DEFAULT_NETWORK_DEGREE);

        let candidates = self
            .store
            .connections_within(anchor, degree)
            .await
            .map_err(|e| Error::dependency(format!("listing connections of {anchor} within {degree}"), e))?;

        let mut network = FamilyNetwork {
            anchor: anchor.clone(),
            by_degree: Default::default(),
            total_connections: candidates.len(),
            max_degree: degree,
            generated_at: Utc::now(),
        };

        for candidate in candidates {
            match self.finder.find_path(anchor, &candidate, degree).await {
                Ok(Some(path)) if (1..=degree).contains(&path.degree) => {
                    network.by_degree.entry(path.degree).or_default().push(candidate);
                }
                Ok(_) => debug!(%anchor, %candidate, "candidate outside network range"),
                Err(e) => warn!(%anchor, %candidate, error = %e, "skipping network candidate"),
            }
        }

        debug!(%anchor, degree, classified = network.classified(), "family network built");
        Ok(network)
    }

    /// Families reachable from both anchors, nearest (by total degree) first.
    pub async fn find_common_connections(
        &self,
        first: &FamilyId,
        second: &FamilyId,
        max_degree: Option<usize>,
    ) -> Result<Vec<CommonConnection>> {
        require_id(first, "first")?;
        require_id(second, "second")?;
        if first == second {
            return Err(Error::Validation(format!("common connections need two distinct families, got {first} twice")));
        }
        let degree = in_range_or(max_degree, MAX_NETWORK_DEGREE, DEFAULT_NETWORK_DEGREE);

        let around_first: HashSet<FamilyId> = self
            .store
            .connections_within(first, degree)
            .await
            .map_err(|e| Error::dependency(format!("listing connections of {first} within {degree}"), e))?
            .into_iter()
            .collect();
        let around_second = self
            .store
            .connections_within(second, degree)
            .await
            .map_err(|e| Error::dependency(format!("listing connections of {second} within {degree}"), e))?;

        let mut common = Vec::new();
        for family in around_second.into_iter().filter(|f| around_first.contains(f)) {
            let to_first = self.finder.find_path(first, &family, degree).await;
            let to_second = self.finder.find_path(second, &family, degree).await;
            match (to_first, to_second) {
                (Ok(Some(p1)), Ok(Some(p2))) => common.push(CommonConnection::new(family, p1, p2)),
                (Err(e), _) | (_, Err(e)) => warn!(%family, error = %e, "skipping common connection"),
                _ => debug!(%family, "common candidate not reachable from both anchors"),
            }
        }

        common.sort_by_key(|c| c.total_degree);
        Ok(common)
    }

    /// Per-edge strength breakdown of an existing path.
    pub async fn analyze_connection_strength(&self, path: &ConnectionPath) -> Result<ConnectionAnalysis> {
        if path.nodes.len() < 2 {
            return Err(Error::Validation(format!(
                "path analysis needs at least two nodes, got {}",
                path.nodes.len()
            )));
        }

        let mut strengths = Vec::with_capacity(path.nodes.len() - 1);
        for (a, b) in path.hops() {
            let s = self
                .store
                .get_connection_strength(a, b)
                .await
                .map_err(|e| Error::dependency(format!("reading strength of {a} -> {b}"), e))?;
            strengths.push(s);
        }

        let (mut weakest, mut weakest_idx) = (1.0, 0);
        let (mut strongest, mut strongest_idx) = (0.0, 0);
        for (i, &s) in strengths.iter().enumerate() {
            if s < weakest {
                weakest = s;
                weakest_idx = i;
            }
            if s > strongest {
                strongest = s;
                strongest_idx = i;
            }
        }
        let average = strengths.iter().sum::<f64>() / strengths.len() as f64;

        Ok(ConnectionAnalysis {
            path: path.clone(),
            total_connections: strengths.len(),
            connection_strengths: strengths,
            weakest_link: weakest,
            weakest_link_index: weakest_idx,
            strongest_link: strongest,
            strongest_link_index: strongest_idx,
            average_strength: average,
            classification: PathClassification::from_mean(average),
            analyzed_at: Utc::now(),
        })
    }

    // ========================================================================
    // Network-wide
    // ========================================================================

    pub async fn get_network_stats(&self) -> Result<NetworkStats> {
        let stats = self
            .store
            .network_stats()
            .await
            .map_err(|e| Error::dependency("reading network statistics", e))?;
        Ok(stats.with_derived())
    }

    /// Recompute a family's trust score from its verified connections.
    pub async fn recompute_trust_score(&self, family: &FamilyId) -> Result<TrustRecomputation> {
        require_id(family, "target")?;
        let current = self
            .store
            .get_family_trust_score(family)
            .await
            .map_err(|e| Error::dependency(format!("reading trust score of {family}"), e))?;
        let edges = self
            .store
            .get_connections(family)
            .await
            .map_err(|e| Error::dependency(format!("listing edges of {family}"), e))?;

        let result = TrustRecomputation::from_edges(family.clone(), current, &edges);
        debug!(%family, current, recomputed = result.recomputed_score, "trust score recomputed");
        Ok(result)
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Score and rank `candidates` for `seeker`, best match first.
    ///
    /// Ineligible candidates are filtered out. A candidate whose family
    /// path cannot be read is skipped; one with no path within
    /// `max_degree` is scored without the connection factor.
    pub async fn find_eligible_matches(
        &self,
        seeker: &Person,
        candidates: Vec<(Person, Family)>,
        max_degree: Option<usize>,
    ) -> Result<Vec<EligibleMatch>> {
        if !seeker.is_eligible_for_marriage() {
            return Err(Error::Validation(format!("person {} is not eligible for matching", seeker.id)));
        }
        require_id(&seeker.family_id, "seeker")?;
        let degree = in_range_or(max_degree, MAX_NETWORK_DEGREE, DEFAULT_NETWORK_DEGREE);

        let mut matches = Vec::new();
        for (candidate, family) in candidates {
            if !seeker.is_eligible_candidate(&candidate) {
                debug!(seeker = %seeker.id, candidate = %candidate.id, name = %candidate.full_name(), "candidate not eligible");
                continue;
            }
            let path = match self.finder.find_path(&seeker.family_id, &candidate.family_id, degree).await {
                Ok(path) => path,
                Err(e) => {
                    warn!(seeker = %seeker.id, candidate = %candidate.id, error = %e, "skipping match candidate");
                    continue;
                }
            };
            matches.push(self.scorer.score(seeker, &candidate, &family, path));
        }

        self.scorer.rank(&mut matches);
        debug!(seeker = %seeker.id, matches = matches.len(), "eligible matches ranked");
        Ok(matches)
    }
}

// ============================================================================
// Tests
// ============================================================================
