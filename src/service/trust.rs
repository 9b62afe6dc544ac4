//! Trust-score recomputation from a family's verified connections.

use serde::{Deserialize, Serialize};
use crate::model::{ConnectionEdge, FamilyId, RelationType, MAX_TRUST_SCORE};

/// Average strength assumed when a family has no verified connections.
pub const DEFAULT_AVERAGE_STRENGTH: f64 = 0.5;

const CONNECTION_FACTOR: f64 = 0.3;
const STRENGTH_FACTOR: f64 = 0.4;
const KINSHIP_FACTOR: f64 = 0.3;

/// A freshly computed trust score next to the stored one.
///
/// Nothing is written back; callers decide whether to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustRecomputation {
    pub family: FamilyId,
    pub current_score: f64,
    pub recomputed_score: f64,
    pub verified_connections: usize,
    pub average_strength: f64,
    pub relative_connections: usize,
    pub community_connections: usize,
}

impl TrustRecomputation {
    /// Build from the stored score and every edge touching `family`.
    /// Unverified edges are ignored.
    pub fn from_edges(family: FamilyId, current_score: f64, edges: &[ConnectionEdge]) -> Self {
        let verified: Vec<&ConnectionEdge> = edges.iter().filter(|e| e.verified).collect();

        let count = verified.len();
        let average_strength = if count == 0 {
            DEFAULT_AVERAGE_STRENGTH
        } else {
            verified.iter().map(|e| e.strength).sum::<f64>() / count as f64
        };
        let relatives = verified.iter().filter(|e| e.is_relative()).count();
        let community = verified
            .iter()
            .filter(|e| e.relation_type == RelationType::CommunityRelation)
            .count();

        let raw = count as f64 * CONNECTION_FACTOR
            + average_strength * STRENGTH_FACTOR
            + (relatives * 2 + community) as f64 * KINSHIP_FACTOR;

        Self {
            family,
            current_score,
            recomputed_score: raw.clamp(0.0, MAX_TRUST_SCORE),
            verified_connections: count,
            average_strength,
            relative_connections: relatives,
            community_connections: community,
        }
    }

    pub fn delta(&self) -> f64 {
        self.recomputed_score - self.current_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(to: &str, rel: RelationType, strength: f64, verified: bool) -> ConnectionEdge {
        ConnectionEdge::new("F1", to, rel, strength).verified(verified)
    }

    #[test]
    fn test_no_verified_edges_uses_default_strength() {
        let edges = vec![edge("F2", RelationType::FamilyRelation, 0.9, false)];
        let t = TrustRecomputation::from_edges(FamilyId::from("F1"), 5.0, &edges);
        assert_eq!(t.verified_connections, 0);
        assert!((t.recomputed_score - 0.2).abs() < 1e-9);
        assert!((t.delta() + 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_formula() {
        let edges = vec![
            edge("F2", RelationType::FamilyRelation, 0.8, true).with_specific_relation("RELATIVE"),
            edge("F3", RelationType::CommunityRelation, 0.6, true),
            edge("F4", RelationType::SocialRelation, 0.4, true),
            edge("F5", RelationType::FamilyRelation, 1.0, false),
        ];
        let t = TrustRecomputation::from_edges(FamilyId::from("F1"), 5.0, &edges);

        assert_eq!(t.verified_connections, 3);
        assert_eq!(t.relative_connections, 1);
        assert_eq!(t.community_connections, 1);
        // 3*0.3 + 0.6*0.4 + (2 + 1)*0.3
        assert!((t.recomputed_score - 2.04).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_to_trust_range() {
        let edges: Vec<_> = (0..40)
            .map(|i| {
                edge(&format!("N{i}"), RelationType::FamilyRelation, 1.0, true)
                    .with_specific_relation("RELATIVE")
            })
            .collect();
        let t = TrustRecomputation::from_edges(FamilyId::from("F1"), 5.0, &edges);
        assert_eq!(t.recomputed_score, MAX_TRUST_SCORE);
    }
}
