//! End-to-end path resolution against MemoryStore.
//!
//! Covers the bidirectional search directly and through the cache, plus
//! property checks over random graphs: every returned path is cycle-free,
//! its degree is its hop count, its strength is the product of its edges,
//! and its length matches a plain BFS distance.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use kinship::{
    BidirectionalBfs, CachedPathFinder, ConnectionEdge, Family, FamilyId, GraphStore, MemoryStore,
    PathFinder, RelationType,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn fid(s: &str) -> FamilyId {
    FamilyId::from(s)
}

fn ids(names: &[&str]) -> Vec<FamilyId> {
    names.iter().map(|n| fid(n)).collect()
}

/// A - B - C - D - E chain plus a weak shortcut A - D.
fn village() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    for f in ["A", "B", "C", "D", "E"] {
        store.add_family(Family::new(f, format!("House {f}")));
    }
    let edges = [
        ("A", "B", 0.9, RelationType::FamilyRelation),
        ("B", "C", 0.8, RelationType::FamilyRelation),
        ("C", "D", 0.7, RelationType::CommunityRelation),
        ("D", "E", 0.6, RelationType::SocialRelation),
        ("A", "D", 0.2, RelationType::SocialRelation),
    ];
    for (a, b, s, rel) in edges {
        store.add_connection(ConnectionEdge::new(a, b, rel, s)).unwrap();
    }
    Arc::new(store)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_shortcut_wins_over_stronger_long_route() {
    let bfs = BidirectionalBfs::new(village());
    let path = bfs.find_path(&fid("A"), &fid("E"), 4).await.unwrap().unwrap();

    assert_eq!(path.nodes, ids(&["A", "D", "E"]));
    assert_eq!(path.degree, 2);
    assert!((path.path_strength - 0.12).abs() < 1e-9);
    assert!(!path.verified);
    assert_eq!(path.relation_types, vec![RelationType::SocialRelation, RelationType::SocialRelation]);
}

#[tokio::test]
async fn test_path_is_symmetric_in_length() {
    let bfs = BidirectionalBfs::new(village());
    let forward = bfs.find_path(&fid("B"), &fid("E"), 4).await.unwrap().unwrap();
    let backward = bfs.find_path(&fid("E"), &fid("B"), 4).await.unwrap().unwrap();

    assert_eq!(forward.degree, backward.degree);
    assert_eq!(forward.source, fid("B"));
    assert_eq!(backward.source, fid("E"));
}

#[tokio::test]
async fn test_unknown_family_has_no_path() {
    let bfs = BidirectionalBfs::new(village());
    assert!(bfs.find_path(&fid("A"), &fid("Z"), 6).await.unwrap().is_none());
}

#[tokio::test]
async fn test_multiple_paths_are_distinct_and_shortest_first() {
    let bfs = BidirectionalBfs::new(village());
    let paths = bfs.find_multiple_paths(&fid("A"), &fid("E"), 4, 5).await.unwrap();

    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].nodes, ids(&["A", "D", "E"]));
    assert_eq!(paths[1].nodes, ids(&["A", "B", "C", "D", "E"]));
    assert!(paths.windows(2).all(|w| w[0].degree <= w[1].degree));
}

#[tokio::test]
async fn test_cache_survives_edge_removal_until_ttl() {
    let store = village();
    let cached = CachedPathFinder::new(BidirectionalBfs::new(Arc::clone(&store)), Duration::from_secs(60));

    let before = cached.find_path(&fid("A"), &fid("E"), 4).await.unwrap().unwrap();
    assert!(store.remove_connection(&fid("A"), &fid("D")));

    // stale but consistent with what was resolved
    let after = cached.find_path(&fid("A"), &fid("E"), 4).await.unwrap().unwrap();
    assert_eq!(before.nodes, after.nodes);

    cached.cache().clear();
    let fresh = cached.find_path(&fid("A"), &fid("E"), 4).await.unwrap().unwrap();
    assert_eq!(fresh.degree, 4);
}

// ============================================================================
// Properties over random graphs
// ============================================================================

fn bfs_distance(adj: &HashMap<usize, Vec<usize>>, from: usize, to: usize) -> Option<usize> {
    let mut dist = HashMap::from([(from, 0usize)]);
    let mut queue = VecDeque::from([from]);
    while let Some(node) = queue.pop_front() {
        if node == to {
            return dist.get(&node).copied();
        }
        let d = dist[&node];
        for &next in adj.get(&node).into_iter().flatten() {
            if !dist.contains_key(&next) {
                dist.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }
    None
}

fn random_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize, f64)>)> {
    (3usize..9).prop_flat_map(|n| {
        let edge = (0..n, 0..n, 0.05f64..1.0);
        (Just(n), prop::collection::vec(edge, 0..(n * 2)))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_paths_are_simple_shortest_and_weighted((n, edges) in random_graph()) {
        let store = MemoryStore::new();
        for i in 0..n {
            store.add_family(Family::new(format!("N{i}"), format!("Family {i}")));
        }
        let mut adj: HashMap<usize, Vec<usize>> = HashMap::new();
        for (a, b, s) in edges {
            let edge = ConnectionEdge::new(format!("N{a}"), format!("N{b}"), RelationType::FamilyRelation, s);
            if store.add_connection(edge).is_ok() {
                adj.entry(a).or_default().push(b);
                adj.entry(b).or_default().push(a);
            }
        }

        let store = Arc::new(store);
        let bfs = BidirectionalBfs::new(Arc::clone(&store));
        let rt = tokio::runtime::Runtime::new().unwrap();

        for from in 0..n {
            for to in 0..n {
                let (a, b) = (FamilyId::new(format!("N{from}")), FamilyId::new(format!("N{to}")));
                let found = rt.block_on(bfs.find_path(&a, &b, 6)).unwrap();
                let expected = bfs_distance(&adj, from, to).filter(|d| *d <= 6);

                prop_assert_eq!(found.as_ref().map(|p| p.degree), expected);
                let Some(path) = found else { continue };

                let mut seen = std::collections::HashSet::new();
                prop_assert!(path.nodes.iter().all(|node| seen.insert(node.clone())));
                prop_assert_eq!(path.degree, path.nodes.len() - 1);
                prop_assert_eq!(path.nodes.first(), Some(&a));
                prop_assert_eq!(path.nodes.last(), Some(&b));

                let mut product = 1.0;
                for w in path.nodes.windows(2) {
                    product *= rt.block_on(store.get_connection_strength(&w[0], &w[1])).unwrap();
                }
                prop_assert!((path.path_strength - product).abs() < 1e-9);
            }
        }
    }
}
