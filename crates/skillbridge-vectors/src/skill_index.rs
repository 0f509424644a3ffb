//! The skill vector index: one vector per known skill, searched by query text.

use crate::{StoredVector, VectorError, VectorResult, VectorStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillbridge_core::types::Skill;
use skillbridge_embeddings::{cosine_similarity, unit_similarity, Embedder};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// A skill name with its similarity to a query, in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub name: String,
    pub similarity: f64,
}

impl SkillMatch {
    pub fn new(name: impl Into<String>, similarity: f64) -> Self {
        Self {
            name: name.into(),
            similarity,
        }
    }
}

/// Approximate nearest-neighbour search over the skill vocabulary.
///
/// Both operations are read-only and deterministic for a fixed index snapshot.
/// An empty index yields an empty list, never an error; errors mean the index
/// itself could not be reached or produced unusable data.
#[async_trait]
pub trait SkillIndex: Send + Sync {
    /// Up to `top_k` skills most similar to `query`, most similar first.
    async fn find_related(&self, query: &str, top_k: usize) -> VectorResult<Vec<SkillMatch>>;

    /// Rank only the skills in `candidates`, keeping those at or above
    /// `min_similarity`, most similar first.
    async fn find_nearest_among(
        &self,
        query: &str,
        candidates: &HashSet<String>,
        top_k: usize,
        min_similarity: f64,
    ) -> VectorResult<Vec<SkillMatch>>;
}

/// [`SkillIndex`] backed by any [`VectorStore`] plus an [`Embedder`].
pub struct SkillVectorIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

impl SkillVectorIndex {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Embed and upsert every skill. Returns the number of skills indexed.
    pub async fn index_skills(&self, skills: &[Skill]) -> VectorResult<usize> {
        if skills.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = skills.iter().map(Skill::embedding_text).collect();
        let embedder = Arc::clone(&self.embedder);
        let vectors = tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            embedder.embed_batch(&refs)
        })
        .await
        .map_err(|e| VectorError::Embedding(format!("embedding task failed: {}", e)))??;

        if vectors.len() != skills.len() {
            return Err(VectorError::Embedding(format!(
                "expected {} skill vectors, got {}",
                skills.len(),
                vectors.len()
            )));
        }

        let records = skills
            .iter()
            .zip(vectors)
            .map(|(skill, vector)| {
                StoredVector::new(skill.name.clone(), vector)
                    .with_metadata("category", skill.category.as_str())
                    .with_metadata("aliases", skill.aliases.join(","))
                    .with_metadata("source_count", skill.source_count)
                    .with_metadata("weight", skill.weight)
            })
            .collect();

        self.store.upsert(records).await?;
        debug!(count = skills.len(), backend = self.store.name(), "indexed skills");
        Ok(skills.len())
    }

    /// Number of skills in the index.
    pub async fn len(&self) -> VectorResult<usize> {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> VectorResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Embed the query off the async executor. `None` when the text carries
    /// no features (blank, punctuation only).
    async fn embed_query(&self, query: &str) -> VectorResult<Option<Vec<f32>>> {
        if query.trim().is_empty() {
            return Ok(None);
        }

        let embedder = Arc::clone(&self.embedder);
        let text = query.to_string();
        let vector = tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|e| VectorError::Embedding(format!("embedding task failed: {}", e)))??;

        if vector.iter().all(|x| *x == 0.0) {
            return Ok(None);
        }
        Ok(Some(vector))
    }
}

fn by_similarity_then_name(a: &SkillMatch, b: &SkillMatch) -> Ordering {
    b.similarity
        .partial_cmp(&a.similarity)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.name.cmp(&b.name))
}

#[async_trait]
impl SkillIndex for SkillVectorIndex {
    async fn find_related(&self, query: &str, top_k: usize) -> VectorResult<Vec<SkillMatch>> {
        if top_k == 0 || self.store.len().await? == 0 {
            return Ok(Vec::new());
        }
        let Some(vector) = self.embed_query(query).await? else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<SkillMatch> = self
            .store
            .nearest(&vector, top_k)
            .await?
            .into_iter()
            .map(|hit| SkillMatch::new(hit.key, unit_similarity(hit.cosine)))
            .collect();
        matches.sort_by(by_similarity_then_name);

        debug!(query, found = matches.len(), "related skills");
        Ok(matches)
    }

    async fn find_nearest_among(
        &self,
        query: &str,
        candidates: &HashSet<String>,
        top_k: usize,
        min_similarity: f64,
    ) -> VectorResult<Vec<SkillMatch>> {
        if top_k == 0 || candidates.is_empty() {
            return Ok(Vec::new());
        }
        let Some(vector) = self.embed_query(query).await? else {
            return Ok(Vec::new());
        };

        let mut ids: Vec<&str> = candidates.iter().map(String::as_str).collect();
        ids.sort_unstable();
        let records = self.store.fetch(&ids).await?;

        let mut matches: Vec<SkillMatch> = records
            .into_iter()
            .map(|record| {
                let similarity = unit_similarity(cosine_similarity(&vector, &record.vector));
                SkillMatch::new(record.key, similarity)
            })
            .filter(|m| m.similarity >= min_similarity)
            .collect();
        matches.sort_by(by_similarity_then_name);
        matches.truncate(top_k);

        debug!(
            query,
            candidates = candidates.len(),
            kept = matches.len(),
            min_similarity,
            "nearest candidate skills"
        );
        Ok(matches)
    }
}
