//! # Graph Store Trait
//!
//! The read contract between the resolution engine and whatever holds
//! the family graph. The engine never writes through it.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |

pub mod memory;

use async_trait::async_trait;
use hashbrown::HashSet;
use crate::model::*;
use crate::{Error, Result};

pub use memory::MemoryStore;

// ============================================================================
// Store Configuration
// ============================================================================

/// Which store to open.
#[derive(Debug, Clone, Default)]
pub enum StoreConfig {
    /// In-memory (no persistence)
    #[default]
    Memory,
}

impl StoreConfig {
    pub fn open(&self) -> MemoryStore {
        match self {
            StoreConfig::Memory => MemoryStore::new(),
        }
    }
}

// ============================================================================
// GraphStore Trait
// ============================================================================

/// Read-only access to the family graph.
///
/// Three methods are required. The rest have defaults: either derived
/// from the required ones, or returning `Error::Unsupported` for stores
/// that cannot answer them.
///
/// Stores give per-call consistency only. Two calls may observe
/// different graph states if someone else is writing.
#[async_trait]
pub trait GraphStore: Send + Sync + 'static {
    // ========================================================================
    // Required
    // ========================================================================

    /// Direct neighbors of a family, without duplicates, in a stable order.
    async fn get_neighbors(&self, id: &FamilyId) -> Result<Vec<FamilyId>>;

    /// Strength of the direct edge between two families, 0.0 if none.
    async fn get_connection_strength(&self, from: &FamilyId, to: &FamilyId) -> Result<f64>;

    /// Current trust score of a family (0..=10).
    async fn get_family_trust_score(&self, id: &FamilyId) -> Result<f64>;

    // ========================================================================
    // Bulk traversal
    // ========================================================================

    /// Every family within `degree` hops of `id`, excluding `id` itself.
    ///
    /// Default: level-synchronous BFS over `get_neighbors`.
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

        Ok(result)
    }

    // ========================================================================
    // Edge metadata
    // ========================================================================

    /// The edge joining two families, if the store can describe it.
    ///
    /// Default: `Ok(None)`; paths then carry no relation types.
    async fn get_connection(&self, _from: &FamilyId, _to: &FamilyId) -> Result<Option<ConnectionEdge>> {
        Ok(None)
    }

    /// All edges touching a family.
    ///
    /// Default returns "not supported".
    async fn get_connections(&self, _id: &FamilyId) -> Result<Vec<ConnectionEdge>> {
        Err(Error::Unsupported("edge listing not supported".into()))
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Raw whole-graph counters. Derived ratios are filled by the caller.
    ///
    /// Default returns "not supported".
    async fn network_stats(&self) -> Result<NetworkStats> {
        Err(Error::Unsupported("network statistics not supported".into()))
    }
}
