//! # Skillbridge Vectors
//!
//! Vector storage and the skill vector index.
//!
//! Two layers:
//!
//! | Layer | Type | Role |
//! |-------|------|------|
//! | Storage | [`VectorStore`] / [`InMemoryStore`] | id → vector + metadata, top-k search |
//! | Skill index | [`SkillIndex`] / [`SkillVectorIndex`] | query text → related skill names |
//!
//! The retriever only talks to [`SkillIndex`]; the storage layer can be
//! swapped for a remote vector database without touching retrieval code.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use skillbridge_core::prelude::*;
//! use skillbridge_embeddings::HashingEmbedder;
//! use skillbridge_vectors::{InMemoryStore, SkillIndex, SkillVectorIndex};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let index = SkillVectorIndex::new(
//!         Arc::new(InMemoryStore::new(256)),
//!         Arc::new(HashingEmbedder::new(256)),
//!     );
//!     index.index_skills(&[Skill::new("Python", SkillCategory::Technical)]).await?;
//!
//!     let related = index.find_related("python", 5).await?;
//!     assert_eq!(related[0].name, "Python");
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod skill_index;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Vector-side failures. The retriever treats every variant as a transport
/// failure; an index with no entries is not an error.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error("Vector index unreachable: {0}")]
    Connection(String),

    #[error("Vector has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Bad vector payload: {0}")]
    Serialization(String),
}

impl From<skillbridge_embeddings::EmbeddingError> for VectorError {
    fn from(e: skillbridge_embeddings::EmbeddingError) -> Self {
        VectorError::Embedding(e.to_string())
    }
}

pub type VectorResult<T> = Result<T, VectorError>;

/// One stored vector, keyed by the skill name it embeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredVector {
    pub key: String,
    pub vector: Vec<f32>,
    /// Payload kept beside the vector (category, aliases, ...).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StoredVector {
    pub fn new(key: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            key: key.into(),
            vector,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(
        mut self,
        field: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(field.into(), value.into());
        self
    }
}

/// A key and its cosine similarity to the probe vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredKey {
    pub key: String,
    pub cosine: f32,
}

/// Keyed vector storage with cosine nearest-neighbour search.
///
/// Implementations may be remote; every method can fail with a
/// [`VectorError`].
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Insert vectors, replacing any stored under the same key.
    async fn upsert(&self, entries: Vec<StoredVector>) -> VectorResult<()>;

    /// The `k` stored keys closest to `probe`, best first, equal scores by key.
    async fn nearest(&self, probe: &[f32], k: usize) -> VectorResult<Vec<ScoredKey>>;

    /// Stored entries for `keys`, in the order given. Missing keys are skipped.
    async fn fetch(&self, keys: &[&str]) -> VectorResult<Vec<StoredVector>>;

    async fn len(&self) -> VectorResult<usize>;
}

pub use memory::InMemoryStore;
pub use skill_index::{SkillIndex, SkillMatch, SkillVectorIndex};
