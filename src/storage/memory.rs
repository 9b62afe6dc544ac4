//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`.
//! It uses simple HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No transactions**: writes are applied immediately, one collection
//!   lock at a time. Multi-step mutations are NOT atomic with respect to
//!   concurrent readers.
//! - **No persistence**: everything is gone when the last handle drops.
//!
//! Use this store for:
//! - Testing the path finders and the resolution service
//! - Embedding the engine in applications that load the graph themselves

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use hashbrown::HashSet;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::*;
use crate::{Error, Result};
use super::GraphStore;

/// Internal edge handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeId(u64);

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory family graph. Cloning shares the same graph.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    families: RwLock<HashMap<FamilyId, Family>>,
    edges: RwLock<HashMap<EdgeId, ConnectionEdge>>,
    /// family → edge IDs in insertion order
    adjacency: RwLock<HashMap<FamilyId, Vec<EdgeId>>>,
    next_edge_id: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                families: RwLock::new(HashMap::new()),
                edges: RwLock::new(HashMap::new()),
                adjacency: RwLock::new(HashMap::new()),
                next_edge_id: AtomicU64::new(1),
            }),
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert or replace a family.
    pub fn add_family(&self, family: Family) {
        let id = family.id.clone();
        self.inner.families.write().insert(id.clone(), family);
        self.inner.adjacency.write().entry(id).or_default();
    }

    /// Overwrite a family's trust score.
    pub fn set_trust_score(&self, id: &FamilyId, score: f64) -> Result<()> {
        let mut families = self.inner.families.write();
        let family = families.get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("Family {id}")))?;
        family.trust_score = score.clamp(0.0, MAX_TRUST_SCORE);
        Ok(())
    }

    /// Add a connection between two existing families.
    ///
    /// Rejects self loops, strengths outside [0, 1], and a second edge
    /// between the same pair (in either direction).
    pub fn add_connection(&self, edge: ConnectionEdge) -> Result<()> {
        if edge.from == edge.to {
            return Err(Error::ConstraintViolation(
                format!("cannot connect family {} to itself", edge.from)
            ));
        }
        if !(0.0..=1.0).contains(&edge.strength) {
            return Err(Error::ConstraintViolation(
                format!("connection strength {} must be between 0 and 1", edge.strength)
            ));
        }

        // Verify both families exist
        {
            let families = self.inner.families.read();
            if !families.contains_key(&edge.from) {
                return Err(Error::NotFound(format!("Source family {}", edge.from)));
            }
            if !families.contains_key(&edge.to) {
                return Err(Error::NotFound(format!("Target family {}", edge.to)));
            }
        }

        if self.find_edge(&edge.from, &edge.to).is_some() {
            return Err(Error::ConstraintViolation(
                format!("families {} and {} are already connected", edge.from, edge.to)
            ));
        }

        let id = EdgeId(self.inner.next_edge_id.fetch_add(1, Ordering::Relaxed));
        let (from, to) = (edge.from.clone(), edge.to.clone());
        self.inner.edges.write().insert(id, edge);

        // Update adjacency for both endpoints
        let mut adj = self.inner.adjacency.write();
        adj.entry(from).or_default().push(id);
        adj.entry(to).or_default().push(id);

        Ok(())
    }

    /// Remove the connection between two families. Returns true if it existed.
    pub fn remove_connection(&self, a: &FamilyId, b: &FamilyId) -> bool {
        let Some(id) = self.find_edge(a, b) else {
            return false;
        };
        self.inner.edges.write().remove(&id);
        let mut adj = self.inner.adjacency.write();
        for end in [a, b] {
            if let Some(ids) = adj.get_mut(end) {
                ids.retain(|eid| *eid != id);
            }
        }
        true
    }

    // ========================================================================
    // Reads (sync helpers)
    // ========================================================================

    pub fn family(&self, id: &FamilyId) -> Option<Family> {
        self.inner.families.read().get(id).cloned()
    }

    pub fn family_count(&self) -> usize {
        self.inner.families.read().len()
    }

    pub fn connection_count(&self) -> usize {
        self.inner.edges.read().len()
    }

    fn find_edge(&self, a: &FamilyId, b: &FamilyId) -> Option<EdgeId> {
        let adj = self.inner.adjacency.read();
        let edges = self.inner.edges.read();
        adj.get(a)?
            .iter()
            .copied()
            .find(|eid| edges.get(eid).is_some_and(|e| e.joins(a, b)))
    }

    fn edges_of(&self, id: &FamilyId) -> Vec<ConnectionEdge> {
        let adj = self.inner.adjacency.read();
        let edges = self.inner.edges.read();
        adj.get(id)
            .map(|ids| ids.iter().filter_map(|eid| edges.get(eid).cloned()).collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

#[async_trait]
impl GraphStore for MemoryStore {
    async fn get_neighbors(&self, id: &FamilyId) -> Result<Vec<FamilyId>> {
        let mut neighbors: Vec<FamilyId> = Vec::new();
        for edge in self.edges_of(id) {
            if let Some(other) = edge.other_end(id) {
                if !neighbors.contains(other) {
                    neighbors.push(other.clone());
                }
            }
        }
        Ok(neighbors)
    }

    async fn get_connection_strength(&self, from: &FamilyId, to: &FamilyId) -> Result<f64> {
        let strength = self.find_edge(from, to)
            .and_then(|eid| self.inner.edges.read().get(&eid).map(|e| e.strength))
            .unwrap_or(0.0);
        Ok(strength)
    }

    async fn get_family_trust_score(&self, id: &FamilyId) -> Result<f64> {
        self.inner.families.read()
            .get(id)
            .map(|f| f.trust_score)
            .ok_or_else(|| Error::NotFound(format!("Family {id}")))
    }

    /// BFS reach, most trusted families first. Ties keep BFS order.
    async fn connections_within(&self, id: &FamilyId, degree: usize) -> Result<Vec<FamilyId>> {
        let mut seen: HashSet<FamilyId> = HashSet::new();
        seen.insert(id.clone());
        let mut result = Vec::new();
        let mut frontier = vec![id.clone()];

        for _ in 0..degree {
            let mut next = Vec::new();
            for node in &frontier {
                for neighbor in self.get_neighbors(node).await? {
                    if seen.insert(neighbor.clone()) {
                        result.push(neighbor.clone());
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() { break; }
            frontier = next;
        }

        let families = self.inner.families.read();
        let trust = |f: &FamilyId| families.get(f).map_or(0.0, |fam| fam.trust_score);
        result.sort_by(|a, b| trust(b).total_cmp(&trust(a)));
        Ok(result)
    }

    async fn get_connection(&self, from: &FamilyId, to: &FamilyId) -> Result<Option<ConnectionEdge>> {
        Ok(self.find_edge(from, to)
            .and_then(|eid| self.inner.edges.read().get(&eid).cloned()))
    }

    async fn get_connections(&self, id: &FamilyId) -> Result<Vec<ConnectionEdge>> {
        Ok(self.edges_of(id))
    }

    async fn network_stats(&self) -> Result<NetworkStats> {
        let families = self.inner.families.read();
        let edges = self.inner.edges.read();

        let total_families = families.len();
        let total_connections = edges.len();
        let verified_connections = edges.values().filter(|e| e.verified).count();
        let average_trust_score = if total_families > 0 {
            families.values().map(|f| f.trust_score).sum::<f64>() / total_families as f64
        } else {
            0.0
        };
        let possible = total_families * total_families.saturating_sub(1) / 2;
        let network_density_percent = if possible > 0 {
            total_connections as f64 / possible as f64 * 100.0
        } else {
            0.0
        };

        Ok(NetworkStats {
            total_families,
            total_connections,
            verified_connections,
            average_trust_score,
            network_density_percent,
            ..NetworkStats::default()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
