//! Family node in the social graph.

use serde::{Deserialize, Serialize};

/// Opaque family identifier.
///
/// The core never looks inside it; identity is all that matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(pub String);

impl FamilyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for FamilyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FamilyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FamilyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Trust scores live on a 0..=10 scale.
pub const MAX_TRUST_SCORE: f64 = 10.0;

/// Trust score a family starts with before any recomputation.
pub const DEFAULT_TRUST_SCORE: f64 = 5.0;

/// The family attributes the core consumes. Everything else a family
/// record carries belongs to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
    pub trust_score: f64,
}

impl Family {
    pub fn new(id: impl Into<FamilyId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            trust_score: DEFAULT_TRUST_SCORE,
        }
    }

    pub fn with_trust_score(mut self, score: f64) -> Self {
        self.trust_score = score.clamp(0.0, MAX_TRUST_SCORE);
        self
    }

    /// Trust score mapped onto [0, 1].
    pub fn normalized_trust(&self) -> f64 {
        (self.trust_score / MAX_TRUST_SCORE).clamp(0.0, 1.0)
    }
}
