//! # kinship: Connection Resolution for Family Graphs
//!
//! Answers "how are these two families related?" over a graph of family
//! nodes joined by weighted, typed connections.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between the engine and storage
//! 2. **Clean DTOs**: `FamilyId`, `ConnectionPath`, `Person` cross all boundaries
//! 3. **Read-only core**: the engine never writes to the graph
//! 4. **Cycle-free paths**: every path handed out has pairwise distinct nodes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kinship::{ConnectionEdge, ConnectionResolutionService, Family, FamilyId, MemoryStore, RelationType};
//!
//! # async fn example() -> kinship::Result<()> {
//! let store = MemoryStore::new();
//! store.add_family(Family::new("F1", "Sharma"));
//! store.add_family(Family::new("F2", "Iyer"));
//! store.add_connection(ConnectionEdge::new("F1", "F2", RelationType::FamilyRelation, 0.9))?;
//!
//! let service = ConnectionResolutionService::new(Arc::new(store));
//! let path = service.find_shortest_path(&FamilyId::from("F1"), &FamilyId::from("F2"), None).await?;
//! assert_eq!(path.map(|p| p.degree), Some(1));
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! | Layer | Module | Description |
//! |-------|--------|-------------|
//! | Store | `storage` | Read access to nodes and edges |
//! | Search | `pathfinding` | Bidirectional BFS, TTL cache, batch fan-out |
//! | Orchestration | `service` | Networks, common connections, strength analysis |
//! | Scoring | `matching` | Multi-factor compatibility between persons |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod pathfinding;
pub mod service;
pub mod matching;
pub mod config;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    FamilyId, Family, ConnectionEdge, RelationType, ConnectionPath,
    Person, Gender, MaritalStatus, MarriagePreferences, EligibleMatch,
    FamilyNetwork, CommonConnection, ConnectionAnalysis, PathClassification, NetworkStats,
};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{GraphStore, MemoryStore, StoreConfig};

// ============================================================================
// Re-exports: Path finding
// ============================================================================

pub use pathfinding::{
    PathFinder, BidirectionalBfs, PathCache, CachedPathFinder,
    ParallelPathResolver, PathQuery, PathResult,
};

// ============================================================================
// Re-exports: Service, scoring, config
// ============================================================================

pub use service::ConnectionResolutionService;
pub use matching::MatchScorer;
pub use config::ResolverConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Dependency error while {context}: {source}")]
    Dependency {
        context: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Cycle detected: {0}")]
    Cycle(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Task error: {0}")]
    Task(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a store failure with what was being resolved.
    pub fn dependency(context: impl Into<String>, source: Error) -> Self {
        Error::Dependency { context: context.into(), source: Box::new(source) }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
