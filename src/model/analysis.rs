//! Aggregate results produced by the resolution service.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::{ConnectionPath, FamilyId};

/// Families around an anchor, bucketed by degree of separation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyNetwork {
    pub anchor: FamilyId,
    /// degree → families at exactly that many hops.
    pub by_degree: BTreeMap<usize, Vec<FamilyId>>,
    /// Candidates the store reported, before classification.
    pub total_connections: usize,
    pub max_degree: usize,
    pub generated_at: DateTime<Utc>,
}

impl FamilyNetwork {
    pub fn at_degree(&self, degree: usize) -> &[FamilyId] {
        self.by_degree.get(&degree).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of families that were placed in a bucket.
    pub fn classified(&self) -> usize {
        self.by_degree.values().map(Vec::len).sum()
    }
}

/// A family reachable from both anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonConnection {
    pub family: FamilyId,
    pub path_to_first: ConnectionPath,
    pub path_to_second: ConnectionPath,
    pub total_degree: usize,
    /// Mean of the two path strengths.
    pub combined_strength: f64,
}

impl CommonConnection {
    pub fn new(family: FamilyId, path_to_first: ConnectionPath, path_to_second: ConnectionPath) -> Self {
        Self {
            total_degree: path_to_first.degree + path_to_second.degree,
            combined_strength: (path_to_first.path_strength + path_to_second.path_strength) / 2.0,
            family,
            path_to_first,
            path_to_second,
        }
    }
}

/// Strength bucket for a path's mean edge strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathClassification {
    Strong,
    Moderate,
    Weak,
    #[serde(rename = "Very Weak")]
    VeryWeak,
}

impl PathClassification {
    /// `>= 0.8` Strong, `>= 0.6` Moderate, `>= 0.4` Weak, else Very Weak.
    pub fn from_mean(mean: f64) -> Self {
        if mean >= 0.8 {
            PathClassification::Strong
        } else if mean >= 0.6 {
            PathClassification::Moderate
        } else if mean >= 0.4 {
            PathClassification::Weak
        } else {
            PathClassification::VeryWeak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PathClassification::Strong => "Strong",
            PathClassification::Moderate => "Moderate",
            PathClassification::Weak => "Weak",
            PathClassification::VeryWeak => "Very Weak",
        }
    }
}

impl std::fmt::Display for PathClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-edge breakdown of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionAnalysis {
    pub path: ConnectionPath,
    pub connection_strengths: Vec<f64>,
    pub weakest_link: f64,
    pub weakest_link_index: usize,
    pub strongest_link: f64,
    pub strongest_link_index: usize,
    pub average_strength: f64,
    pub total_connections: usize,
    pub classification: PathClassification,
    pub analyzed_at: DateTime<Utc>,
}

/// Whole-graph counters, computed on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_families: usize,
    /// Undirected edges.
    pub total_connections: usize,
    pub verified_connections: usize,
    pub average_trust_score: f64,
    pub network_density_percent: f64,
    /// Filled by [`NetworkStats::with_derived`].
    pub verification_rate: f64,
    pub average_connections_per_family: f64,
}

impl NetworkStats {
    /// Fill the ratios that follow from the raw counters.
    pub fn with_derived(mut self) -> Self {
        self.verification_rate = if self.total_connections > 0 {
            self.verified_connections as f64 / self.total_connections as f64 * 100.0
        } else {
            0.0
        };
        // every connection touches two families
        self.average_connections_per_family = if self.total_families > 0 {
            (self.total_connections * 2) as f64 / self.total_families as f64
        } else {
            0.0
        };
        self
    }
}
