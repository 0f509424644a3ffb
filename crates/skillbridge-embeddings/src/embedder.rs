//! The embedder trait.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The embedding backend failed or answered with something unusable.
    #[error("Embedding backend failed: {0}")]
    Backend(String),

    #[error("Cannot embed empty text")]
    EmptyText,

    #[error("Vectors differ in length: {expected} vs {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Turns skill documents and queries into fixed-length vectors.
///
/// Skills and queries must go through the same embedder, or similarities
/// between them are meaningless. Implementations may block on I/O; the skill
/// index calls them from `spawn_blocking`.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Embed several texts. Backends with a batch endpoint should override this.
    fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;

    /// Cosine of two vectors from this embedder, in [-1, 1].
    fn similarity(&self, a: &[f32], b: &[f32]) -> EmbeddingResult<f32> {
        if a.len() != b.len() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: a.len(),
                got: b.len(),
            });
        }
        Ok(crate::normalize::cosine_similarity(a, b))
    }
}
