//! Bidirectional breadth-first search with cycle exclusion.
//!
//! Two frontiers grow one level at a time, forward from the source and
//! backward from the target, until a newly discovered neighbor is already
//! known to the opposite side. Every splice found in that pass has the
//! same (minimal) length; among them the strongest path wins, and
//! remaining ties go to discovery order.
//!
//! The search is sequential: each expansion awaits its neighbor lookup
//! before issuing the next one.

use std::collections::VecDeque;
use std::sync::Arc;
use async_trait::async_trait;
use hashbrown::{HashMap, HashSet};
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::model::*;
use crate::storage::GraphStore;
use crate::{Error, Result};
use super::PathFinder;

/// An edge counts as verified when its strength is above this.
pub const VERIFIED_STRENGTH_THRESHOLD: f64 = 0.5;

/// Origin → current node. Paths are at most a handful of hops.
type NodeChain = SmallVec<[FamilyId; 8]>;

/// One partial path in a frontier. `chain` doubles as the state's
/// visited set.
#[derive(Debug, Clone)]
struct PathState {
    node: FamilyId,
    chain: NodeChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Forward,
    Backward,
}

struct Frontier {
    states: Vec<PathState>,
    /// Every node this side has reached, with the chain that reached it first.
    visited: HashMap<FamilyId, NodeChain>,
    depth: usize,
}

impl Frontier {
    fn new(origin: &FamilyId) -> Self {
        let chain: NodeChain = smallvec![origin.clone()];
        let mut visited = HashMap::new();
        visited.insert(origin.clone(), chain.clone());
        Self {
            states: vec![PathState { node: origin.clone(), chain }],
            visited,
            depth: 0,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.states.is_empty()
    }
}

/// Join a chain with the opposite side's chain into a source → target list.
fn splice(side: Side, chain: &[FamilyId], meeting: &[FamilyId]) -> Vec<FamilyId> {
    let (head, tail) = match side {
        Side::Forward => (chain, meeting),
        Side::Backward => (meeting, chain),
    };
    head.iter().chain(tail.iter().rev()).cloned().collect()
}

// ============================================================================
// BidirectionalBfs
// ============================================================================

/// Shortest-path finder over a [`GraphStore`].
pub struct BidirectionalBfs<S: GraphStore> {
    store: Arc<S>,
}

impl<S: GraphStore> BidirectionalBfs<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn neighbors(&self, node: &FamilyId, from: &FamilyId, to: &FamilyId) -> Result<Vec<FamilyId>> {
        self.store.get_neighbors(node).await.map_err(|e| {
            Error::dependency(format!("neighbors of {node} while resolving {from} -> {to}"), e)
        })
    }

    /// Grow `this` by one level. Returns every cycle-free splice with `other`.
    async fn expand(
        &self,
        this: &mut Frontier,
        other: &Frontier,
        side: Side,
        from: &FamilyId,
        to: &FamilyId,
    ) -> Result<Vec<Vec<FamilyId>>> {
        let states = std::mem::take(&mut this.states);
        let mut next = Vec::new();
        let mut candidates = Vec::new();

        for state in &states {
            for neighbor in self.neighbors(&state.node, from, to).await? {
                if let Some(meeting) = other.visited.get(&neighbor) {
                    let spliced = splice(side, &state.chain, meeting);
                    if is_cycle_free(&spliced) {
                        candidates.push(spliced);
                    }
                    continue;
                }

                if state.chain.contains(&neighbor) || this.visited.contains_key(&neighbor) {
                    continue;
                }

                let mut chain = state.chain.clone();
                chain.push(neighbor.clone());
                this.visited.insert(neighbor.clone(), chain.clone());
                next.push(PathState { node: neighbor, chain });
            }
        }

        this.states = next;
        this.depth += 1;
        Ok(candidates)
    }

    /// Product of edge strengths, verification, and relation types.
    async fn measure(
        &self,
        nodes: &[FamilyId],
        from: &FamilyId,
        to: &FamilyId,
    ) -> Result<(f64, bool, Vec<RelationType>)> {
        let mut strength = 1.0;
        let mut verified = true;
        let mut relation_types = Vec::with_capacity(nodes.len().saturating_sub(1));
        let mut fully_typed = true;

        for hop in nodes.windows(2) {
            let (a, b) = (&hop[0], &hop[1]);
            let edge_strength = self.store.get_connection_strength(a, b).await.map_err(|e| {
                Error::dependency(format!("strength of {a} -> {b} while resolving {from} -> {to}"), e)
            })?;
            strength *= edge_strength;
            if edge_strength <= VERIFIED_STRENGTH_THRESHOLD {
                verified = false;
            }

            let edge = self.store.get_connection(a, b).await.map_err(|e| {
                Error::dependency(format!("edge {a} -> {b} while resolving {from} -> {to}"), e)
            })?;
            match edge {
                Some(edge) => relation_types.push(edge.relation_type),
                None => fully_typed = false,
            }
        }

        if !fully_typed {
            relation_types.clear();
        }
        Ok((strength, verified, relation_types))
    }

    async fn assemble(&self, nodes: Vec<FamilyId>, from: &FamilyId, to: &FamilyId) -> Result<ConnectionPath> {
        let (strength, verified, relation_types) = self.measure(&nodes, from, to).await?;
        let mut path = ConnectionPath::from_nodes(nodes)?;
        path.path_strength = strength;
        path.verified = verified;
        path.relation_types = relation_types;
        Ok(path)
    }

    /// Shortest candidate, then strongest, then first discovered.
    async fn select_best(
        &self,
        candidates: Vec<Vec<FamilyId>>,
        from: &FamilyId,
        to: &FamilyId,
    ) -> Result<Option<ConnectionPath>> {
        let Some(shortest) = candidates.iter().map(Vec::len).min() else {
            return Ok(None);
        };

        let mut best: Option<ConnectionPath> = None;
        for nodes in candidates.into_iter().filter(|c| c.len() == shortest) {
            let path = self.assemble(nodes, from, to).await?;
            if best.as_ref().is_none_or(|b| path.path_strength > b.path_strength) {
                best = Some(path);
            }
        }
        Ok(best)
    }

    /// Plain BFS that skips any path whose key is in `excluded`.
    ///
    /// Each intermediate node may be entered at most `excluded.len() + 1`
    /// times, which is enough to route around every excluded path while
    /// keeping the search polynomial.
    async fn find_path_excluding(
        &self,
        from: &FamilyId,
        to: &FamilyId,
        max_depth: usize,
        excluded: &HashSet<String>,
    ) -> Result<Option<ConnectionPath>> {
        if from == to {
            let single = ConnectionPath::single(from.clone());
            return Ok((!excluded.contains(&single.key())).then_some(single));
        }

        let entry_budget = excluded.len() + 1;
        let mut entries: HashMap<FamilyId, usize> = HashMap::new();
        let mut queue: VecDeque<NodeChain> = VecDeque::new();
        queue.push_back(smallvec![from.clone()]);

        while let Some(chain) = queue.pop_front() {
            // a chain of n nodes has n - 1 hops; one more must still fit
            if chain.len() > max_depth {
                continue;
            }
            let Some(node) = chain.last() else { continue };

            for neighbor in self.neighbors(node, from, to).await? {
                if chain.contains(&neighbor) {
                    continue;
                }
                let mut next = chain.clone();
                next.push(neighbor.clone());

                if neighbor == *to {
                    if excluded.contains(&path_key(&next)) {
                        continue;
                    }
                    return self.assemble(next.into_vec(), from, to).await.map(Some);
                }

                let count = entries.entry(neighbor).or_insert(0);
                if *count >= entry_budget {
                    continue;
                }
                *count += 1;
                queue.push_back(next);
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl<S: GraphStore> PathFinder for BidirectionalBfs<S> {
    async fn find_path(
        &self,
        from: &FamilyId,
        to: &FamilyId,
        max_depth: usize,
    ) -> Result<Option<ConnectionPath>> {
        if from == to {
            return Ok(Some(ConnectionPath::single(from.clone())));
        }

        let mut forward = Frontier::new(from);
        let mut backward = Frontier::new(to);

        loop {
            let mut expanded = false;

            for side in [Side::Forward, Side::Backward] {
                if forward.depth + backward.depth >= max_depth {
                    break;
                }
                let candidates = match side {
                    Side::Forward if !forward.is_exhausted() => {
                        self.expand(&mut forward, &backward, side, from, to).await?
                    }
                    Side::Backward if !backward.is_exhausted() => {
                        self.expand(&mut backward, &forward, side, from, to).await?
                    }
                    _ => continue,
                };
                expanded = true;

                if !candidates.is_empty() {
                    let best = self.select_best(candidates, from, to).await?;
                    if let Some(path) = &best {
                        debug!(%from, %to, degree = path.degree, strength = path.path_strength, "path resolved");
                    }
                    return Ok(best);
                }
            }

            if !expanded {
                break;
            }
        }

        debug!(%from, %to, max_depth, "no path within depth");
        Ok(None)
    }

    async fn find_multiple_paths(
        &self,
        from: &FamilyId,
        to: &FamilyId,
        max_depth: usize,
        max_paths: usize,
    ) -> Result<Vec<ConnectionPath>> {
        let mut paths = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for _ in 0..max_paths {
            let Some(path) = self.find_path_excluding(from, to, max_depth, &seen).await? else {
                break;
            };
            if !is_cycle_free(&path.nodes) || !seen.insert(path.key()) {
                break;
            }
            paths.push(path);
        }

        debug!(%from, %to, found = paths.len(), "multiple paths resolved");
        Ok(paths)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn fid(s: &str) -> FamilyId {
        FamilyId::from(s)
    }

    fn ids(names: &[&str]) -> Vec<FamilyId> {
        names.iter().map(|n| fid(n)).collect()
    }

    fn graph(families: &[&str], edges: &[(&str, &str, f64, bool)]) -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        for f in families {
            store.add_family(Family::new(*f, *f));
        }
        for (a, b, strength, verified) in edges {
            store
                .add_connection(
                    ConnectionEdge::new(*a, *b, RelationType::FamilyRelation, *strength).verified(*verified),
                )
                .unwrap();
        }
        Arc::new(store)
    }

    /// Store whose neighbor lookup fails for one family.
    struct BrokenStore {
        inner: MemoryStore,
        broken: FamilyId,
    }

    #[async_trait]
    impl GraphStore for BrokenStore {
        async fn get_neighbors(&self, id: &FamilyId) -> Result<Vec<FamilyId>> {
            if *id == self.broken {
                return Err(Error::Storage("connection reset".into()));
            }
            self.inner.get_neighbors(id).await
        }

        async fn get_connection_strength(&self, from: &FamilyId, to: &FamilyId) -> Result<f64> {
            self.inner.get_connection_strength(from, to).await
        }

        async fn get_family_trust_score(&self, id: &FamilyId) -> Result<f64> {
            self.inner.get_family_trust_score(id).await
        }
    }

    #[tokio::test]
    async fn test_self_path() {
        let bfs = BidirectionalBfs::new(graph(&["X"], &[]));
        for depth in [0, 1, 6] {
            let path = bfs.find_path(&fid("X"), &fid("X"), depth).await.unwrap().unwrap();
            assert_eq!(path.nodes, ids(&["X"]));
            assert_eq!(path.degree, 0);
            assert_eq!(path.path_strength, 1.0);
            assert!(path.verified);
        }
    }

    #[tokio::test]
    async fn test_chain_strength_and_verification() {
        let store = graph(&["A", "B", "C"], &[("A", "B", 0.9, true), ("B", "C", 0.5, false)]);
        let bfs = BidirectionalBfs::new(store);

        let path = bfs.find_path(&fid("A"), &fid("C"), 3).await.unwrap().unwrap();
        assert_eq!(path.nodes, ids(&["A", "B", "C"]));
        assert_eq!(path.degree, 2);
        assert!((path.path_strength - 0.45).abs() < 1e-9);
        assert!(!path.verified);
        assert_eq!(path.relation_types, vec![RelationType::FamilyRelation; 2]);
    }

    #[tokio::test]
    async fn test_direct_neighbor() {
        let bfs = BidirectionalBfs::new(graph(&["A", "B"], &[("A", "B", 0.8, true)]));
        let path = bfs.find_path(&fid("A"), &fid("B"), 1).await.unwrap().unwrap();
        assert_eq!(path.nodes, ids(&["A", "B"]));
        assert!(path.verified);
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let store = graph(
            &["A", "B", "C", "D"],
            &[("A", "B", 0.9, true), ("B", "C", 0.9, true), ("C", "D", 0.9, true)],
        );
        let bfs = BidirectionalBfs::new(store);

        assert!(bfs.find_path(&fid("A"), &fid("D"), 2).await.unwrap().is_none());
        assert!(bfs.find_path(&fid("A"), &fid("B"), 0).await.unwrap().is_none());
        let path = bfs.find_path(&fid("A"), &fid("D"), 3).await.unwrap().unwrap();
        assert_eq!(path.degree, 3);
    }

    #[tokio::test]
    async fn test_disconnected() {
        let bfs = BidirectionalBfs::new(graph(&["A", "B", "C"], &[("A", "B", 0.9, true)]));
        assert!(bfs.find_path(&fid("A"), &fid("C"), 6).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shortest_through_cycles() {
        // A - B - C - D with a shortcut A - C, plus a triangle B - E - C
        let store = graph(
            &["A", "B", "C", "D", "E"],
            &[
                ("A", "B", 0.9, true),
                ("B", "C", 0.9, true),
                ("C", "D", 0.9, true),
                ("A", "C", 0.6, true),
                ("B", "E", 0.9, true),
                ("E", "C", 0.9, true),
            ],
        );
        let bfs = BidirectionalBfs::new(store);

        let path = bfs.find_path(&fid("A"), &fid("D"), 4).await.unwrap().unwrap();
        assert_eq!(path.nodes, ids(&["A", "C", "D"]));
        assert!(is_cycle_free(&path.nodes));
    }

    #[tokio::test]
    async fn test_equal_length_tie_prefers_strength() {
        // two 2-hop routes; the one discovered second is stronger
        let store = graph(
            &["X", "P", "Q", "Y"],
            &[
                ("X", "P", 0.4, false),
                ("X", "Q", 0.9, true),
                ("P", "Y", 0.4, false),
                ("Q", "Y", 0.9, true),
            ],
        );
        let bfs = BidirectionalBfs::new(store);

        let path = bfs.find_path(&fid("X"), &fid("Y"), 4).await.unwrap().unwrap();
        assert_eq!(path.nodes, ids(&["X", "Q", "Y"]));
        assert!((path.path_strength - 0.81).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_store_failure_is_dependency_error() {
        let inner = MemoryStore::new();
        for f in ["A", "B", "C"] {
            inner.add_family(Family::new(f, f));
        }
        inner.add_connection(ConnectionEdge::new("A", "B", RelationType::FamilyRelation, 0.9)).unwrap();
        inner.add_connection(ConnectionEdge::new("B", "C", RelationType::FamilyRelation, 0.9)).unwrap();
        let bfs = BidirectionalBfs::new(Arc::new(BrokenStore { inner, broken: fid("C") }));

        let err = bfs.find_path(&fid("A"), &fid("C"), 3).await.unwrap_err();
        match err {
            Error::Dependency { context, source } => {
                assert!(context.contains("C"), "context should name the family: {context}");
                assert!(matches!(*source, Error::Storage(_)));
            }
            other => panic!("expected dependency error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_multiple_disjoint_paths() {
        let store = graph(
            &["X", "M", "N", "Y"],
            &[("X", "M", 0.8, true), ("M", "Y", 0.8, true), ("X", "N", 0.6, true), ("N", "Y", 0.6, true)],
        );
        let bfs = BidirectionalBfs::new(store);

        let paths = bfs.find_multiple_paths(&fid("X"), &fid("Y"), 4, 5).await.unwrap();
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0].key(), paths[1].key());
        for p in &paths {
            assert!(is_cycle_free(&p.nodes));
            assert_eq!(p.degree, 2);
        }
    }

    #[tokio::test]
    async fn test_multiple_paths_through_shared_node() {
        // X - A - C - Y and X - B - C - Y share C
        let store = graph(
            &["X", "A", "B", "C", "Y"],
            &[
                ("X", "A", 0.9, true),
                ("X", "B", 0.9, true),
                ("A", "C", 0.9, true),
                ("B", "C", 0.9, true),
                ("C", "Y", 0.9, true),
            ],
        );
        let bfs = BidirectionalBfs::new(store);

        let paths = bfs.find_multiple_paths(&fid("X"), &fid("Y"), 4, 10).await.unwrap();
        let keys: Vec<String> = paths.iter().map(ConnectionPath::key).collect();
        assert_eq!(keys, vec!["X->A->C->Y".to_string(), "X->B->C->Y".to_string()]);
    }

    #[tokio::test]
    async fn test_multiple_paths_respects_limits() {
        let store = graph(
            &["X", "M", "N", "Y"],
            &[("X", "M", 0.8, true), ("M", "Y", 0.8, true), ("X", "N", 0.6, true), ("N", "Y", 0.6, true)],
        );
        let bfs = BidirectionalBfs::new(store);

        assert_eq!(bfs.find_multiple_paths(&fid("X"), &fid("Y"), 4, 1).await.unwrap().len(), 1);
        assert!(bfs.find_multiple_paths(&fid("X"), &fid("Y"), 1, 5).await.unwrap().is_empty());

        let own = bfs.find_multiple_paths(&fid("X"), &fid("X"), 4, 3).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].degree, 0);
    }
}
