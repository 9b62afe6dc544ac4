//! ConnectionPath: an ordered, cycle-free chain of families.

use chrono::{DateTime, Utc};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use super::{FamilyId, RelationType};
use crate::{Error, Result};

/// A resolved path between two families.
///
/// Invariants (enforced by [`ConnectionPath::from_nodes`]):
/// - `nodes` is non-empty and pairwise distinct
/// - `degree == nodes.len() - 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPath {
    pub source: FamilyId,
    pub target: FamilyId,
    /// Families in order, `source` first, `target` last.
    pub nodes: Vec<FamilyId>,
    pub degree: usize,
    /// Product of the edge strengths along the path. 1.0 for a single node.
    pub path_strength: f64,
    /// True when every edge on the path counts as verified.
    pub verified: bool,
    /// One entry per edge, when the store can report edge metadata.
    pub relation_types: Vec<RelationType>,
    pub calculated_at: DateTime<Utc>,
}

impl ConnectionPath {
    /// The degenerate path from a family to itself.
    pub fn single(id: FamilyId) -> Self {
        Self {
            source: id.clone(),
            target: id.clone(),
            nodes: vec![id],
            degree: 0,
            path_strength: 1.0,
            verified: true,
            relation_types: Vec::new(),
            calculated_at: Utc::now(),
        }
    }

    /// Build a path from an ordered node sequence.
    ///
    /// Strength and verification start at their neutral values; the path
    /// finder fills them in once edge weights are known.
    pub fn from_nodes(nodes: Vec<FamilyId>) -> Result<Self> {
        ensure_cycle_free(&nodes)?;
        let (source, target) = match (nodes.first(), nodes.last()) {
            (Some(s), Some(t)) => (s.clone(), t.clone()),
            _ => return Err(Error::Validation("path must contain at least one family".into())),
        };
        Ok(Self {
            source,
            target,
            degree: nodes.len() - 1,
            nodes,
            path_strength: 1.0,
            verified: true,
            relation_types: Vec::new(),
            calculated_at: Utc::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Exact-sequence key, e.g. `A->B->C`.
    pub fn key(&self) -> String {
        path_key(&self.nodes)
    }

    /// Consecutive node pairs, one per edge.
    pub fn hops(&self) -> impl Iterator<Item = (&FamilyId, &FamilyId)> {
        self.nodes.windows(2).map(|w| (&w[0], &w[1]))
    }

    pub fn contains(&self, id: &FamilyId) -> bool {
        self.nodes.contains(id)
    }
}

/// True when no family appears twice in `nodes`.
///
/// This is the one cycle check; search expansion, splicing and final
/// validation all go through it.
pub fn is_cycle_free(nodes: &[FamilyId]) -> bool {
    let mut seen = HashSet::with_capacity(nodes.len());
    nodes.iter().all(|id| seen.insert(id))
}

/// [`is_cycle_free`] as a `Result`, naming the first repeated family.
pub fn ensure_cycle_free(nodes: &[FamilyId]) -> Result<()> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for id in nodes {
        if !seen.insert(id) {
            return Err(Error::Cycle(format!(
                "family {id} appears twice in {}",
                path_key(nodes)
            )));
        }
    }
    Ok(())
}

/// Exact-sequence key for a node list.
pub fn path_key(nodes: &[FamilyId]) -> String {
    nodes.iter().map(FamilyId::as_str).collect::<Vec<_>>().join("->")
}
