//! Connection (edge) between two families.

use serde::{Deserialize, Serialize};
use super::FamilyId;

/// Specific relation marking a blood or marriage relative.
pub const SPECIFIC_RELATIVE: &str = "RELATIVE";

/// Broad category of a family connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    FamilyRelation,
    CommunityRelation,
    SocialRelation,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::FamilyRelation => "FAMILY_RELATION",
            RelationType::CommunityRelation => "COMMUNITY_RELATION",
            RelationType::SocialRelation => "SOCIAL_RELATION",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weighted, typed connection between two families.
///
/// Stored once but traversable in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEdge {
    pub from: FamilyId,
    pub to: FamilyId,
    pub relation_type: RelationType,
    /// Free-form subtype, e.g. `RELATIVE`, `FAMILY_FRIEND`, `NEIGHBOR`.
    pub specific_relation: String,
    /// Strength in [0, 1].
    pub strength: f64,
    pub verified: bool,
}

impl ConnectionEdge {
    pub fn new(
        from: impl Into<FamilyId>,
        to: impl Into<FamilyId>,
        relation_type: RelationType,
        strength: f64,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type,
            specific_relation: String::new(),
            strength,
            verified: false,
        }
    }

    pub fn with_specific_relation(mut self, relation: impl Into<String>) -> Self {
        self.specific_relation = relation.into();
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn is_relative(&self) -> bool {
        self.specific_relation == SPECIFIC_RELATIVE
    }

    /// The other end of the edge from the given family.
    pub fn other_end(&self, from: &FamilyId) -> Option<&FamilyId> {
        if *from == self.from { Some(&self.to) }
        else if *from == self.to { Some(&self.from) }
        else { None }
    }

    /// True if this edge joins `a` and `b`, in either direction.
    pub fn joins(&self, a: &FamilyId, b: &FamilyId) -> bool {
        (self.from == *a && self.to == *b) || (self.from == *b && self.to == *a)
    }
}
