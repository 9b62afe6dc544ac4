//! # Family Graph Model
//!
//! Plain DTOs shared by the store, the path finders and the service.
//!
//! Design rule: no I/O, no locks, no async here. Everything in this
//! module is a value produced per call.

pub mod family;
pub mod connection;
pub mod path;
pub mod person;
pub mod analysis;

pub use family::{Family, FamilyId, MAX_TRUST_SCORE, DEFAULT_TRUST_SCORE};
pub use connection::{ConnectionEdge, RelationType, SPECIFIC_RELATIVE};
pub use path::{ConnectionPath, is_cycle_free, ensure_cycle_free, path_key};
pub use person::{
    Person, Gender, MaritalStatus, Education, Profession, MarriagePreferences,
    EligibleMatch, MIN_ELIGIBLE_AGE, MAX_ELIGIBLE_AGE,
};
pub use analysis::{
    FamilyNetwork, CommonConnection, ConnectionAnalysis, PathClassification, NetworkStats,
};
