//! # Skillbridge Embeddings
//!
//! Embedding backends for the skill vector index.
//!
//! This crate turns skill documents and user queries into dense vectors:
//! - Text → vector conversion
//! - Cosine similarity on the [0, 1] scale the retriever thresholds against
//!
//! ## Features
//!
//! - `api`: OpenAI-compatible HTTP embeddings (OpenAI, OpenRouter, self-hosted)
//!
//! ## Usage
//!
//! ```rust
//! use skillbridge_embeddings::{Embedder, HashingEmbedder};
//!
//! let embedder = HashingEmbedder::new(128);
//! let a = embedder.embed("python programming").unwrap();
//! let b = embedder.embed("Python Programming").unwrap();
//! assert!((embedder.similarity(&a, &b).unwrap() - 1.0).abs() < 1e-5);
//! ```

mod embedder;
mod hashing;
mod normalize;

pub use embedder::{Embedder, EmbeddingError, EmbeddingResult};
pub use hashing::HashingEmbedder;
pub use normalize::{cosine_similarity, normalize_l2, unit_similarity};

#[cfg(feature = "api")]
mod api;
#[cfg(feature = "api")]
pub use api::{ApiConfig, ApiEmbedder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cosine_similarity, normalize_l2, unit_similarity};
    pub use crate::{Embedder, EmbeddingError, EmbeddingResult, HashingEmbedder};

    #[cfg(feature = "api")]
    pub use crate::{ApiConfig, ApiEmbedder};
}
