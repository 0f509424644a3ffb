//! Feature-hashing embedder (no model files, no network).
//!
//! Words and character trigrams are hashed into a fixed-dimension signed
//! vector. Trigrams give partial credit to morphological neighbours
//! ("program" / "programming"), which is enough for the semantic bridge to
//! find loosely related skills in tests and offline demos.

use crate::{Embedder, EmbeddingError, EmbeddingResult};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic hashing embedder.
///
/// # Example
///
/// ```rust
/// use skillbridge_embeddings::{Embedder, HashingEmbedder};
///
/// let embedder = HashingEmbedder::new(128);
/// let vec = embedder.embed("data visualization").unwrap();
/// assert_eq!(vec.len(), 128);
/// ```
pub struct HashingEmbedder {
    dimension: usize,
    num_hashes: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            num_hashes: 2,
        }
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    fn trigrams(word: &str) -> Vec<String> {
        let padded: Vec<char> = format!("#{}#", word).chars().collect();
        padded
            .windows(3)
            .map(|w| w.iter().collect::<String>())
            .collect()
    }

    fn bucket(&self, feature: &str, seed: u64) -> (usize, f32) {
        let mut hasher = DefaultHasher::new();
        seed.hash(&mut hasher);
        feature.hash(&mut hasher);
        let h = hasher.finish();
        let idx = (h % self.dimension as u64) as usize;
        // High bit picks the sign so index and sign stay independent.
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        (idx, sign)
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        for seed in 0..self.num_hashes as u64 {
            let (idx, sign) = self.bucket(feature, seed);
            vector[idx] += sign * weight;
        }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        let mut vector = vec![0.0f32; self.dimension];
        for word in Self::tokenize(text) {
            self.add_feature(&mut vector, &format!("w:{}", word), WORD_WEIGHT);
            for gram in Self::trigrams(&word) {
                self.add_feature(&mut vector, &format!("g:{}", gram), TRIGRAM_WEIGHT);
            }
        }

        crate::normalize::normalize_l2(&mut vector);
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hashing-trigram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeddings_are_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(128);
        let v1 = embedder.embed("Machine Learning").unwrap();
        let v2 = embedder.embed("machine   learning").unwrap();

        assert_eq!(v1, v2);
        let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let embedder = HashingEmbedder::new(512);
        let query = embedder.embed("python programming").unwrap();
        let related = embedder.embed("Programming. Category: technical").unwrap();
        let unrelated = embedder.embed("Negotiation. Category: soft").unwrap();

        let sim_related = embedder.similarity(&query, &related).unwrap();
        let sim_unrelated = embedder.similarity(&query, &unrelated).unwrap();
        assert!(sim_related > sim_unrelated);
    }

    #[test]
    fn single_letter_skills_are_embedded() {
        let embedder = HashingEmbedder::new(512);
        let query = embedder.embed("R").unwrap();
        assert!(query.iter().any(|x| *x != 0.0));

        let r = embedder.embed("R. Category: technical").unwrap();
        let c = embedder.embed("C. Category: technical").unwrap();
        assert!(embedder.similarity(&query, &r).unwrap() > embedder.similarity(&query, &c).unwrap());
    }

    #[test]
    fn empty_text_is_invalid() {
        let embedder = HashingEmbedder::default();
        assert!(matches!(
            embedder.embed("   "),
            Err(EmbeddingError::EmptyText)
        ));
    }

    #[test]
    fn punctuation_only_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::new(32);
        let v = embedder.embed("?!").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
