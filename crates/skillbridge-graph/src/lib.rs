//! # Skillbridge Graph
//!
//! The entity graph: Course, Skill and Application nodes joined by two
//! directed, weighted edge kinds.
//!
//! ```text
//! (Course) --teaches--> (Skill) <--develops-- (Application)
//! ```
//!
//! There is no Course → Application edge. Courses reach applications only
//! through the skills they share, so every recommendation passes through the
//! skill layer.
//!
//! ## Backends
//!
//! | Backend | Feature Flag | Description |
//! |---------|--------------|-------------|
//! | [`InMemoryGraph`] | (default) | petgraph `DiGraph`, built once from a catalog |
//! | `SqliteGraph` | `sqlite` | Persistent SQLite tables, same semantics |

pub mod loader;
pub mod matching;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use async_trait::async_trait;
use serde::Serialize;
use skillbridge_core::types::{AppMatch, TaughtSkill};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised by graph backends.
///
/// "Nothing matched" is never an error; these represent a backend that could
/// not answer.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Invalid weight on {edge}: {weight} (must be 0.0-1.0)")]
    InvalidWeight { edge: String, weight: f64 },

    #[error("Unknown {kind} referenced by edge: {key}")]
    UnknownEndpoint { kind: &'static str, key: String },
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for GraphError {
    fn from(e: rusqlite::Error) -> Self {
        GraphError::Query(e.to_string())
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Node and edge counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub skills: usize,
    pub courses: usize,
    pub applications: usize,
    pub teaches: usize,
    pub develops: usize,
    pub active_skills: usize,
}

/// Read patterns the retriever needs from the entity graph.
#[async_trait]
pub trait EntityGraph: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Every application with a develops edge to any of `skills`, grouped per
    /// application. `score` is the sum of the matched edge weights. Returns the
    /// top `top_k` by score, then matched-skill count, then app id.
    async fn apps_for_skills(&self, skills: &[String], top_k: usize)
        -> GraphResult<Vec<AppMatch>>;

    /// Names of skills with at least one incoming develops edge, computed from
    /// the current edges.
    async fn active_skills(&self) -> GraphResult<HashSet<String>>;

    /// Skills taught by a course, heaviest first. Unknown course → empty.
    async fn skills_for_course(&self, course_code: &str) -> GraphResult<Vec<TaughtSkill>>;

    /// Node and edge counts.
    async fn counts(&self) -> GraphResult<GraphCounts>;
}

pub use loader::{CatalogPlan, LoadReport};
pub use matching::MatchAccumulator;
pub use memory::InMemoryGraph;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteGraph;
