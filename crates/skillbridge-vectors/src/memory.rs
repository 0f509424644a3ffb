//! Brute-force vector store.
//!
//! A skill vocabulary is a few thousand entries at most, so a linear scan per
//! query is fast enough and keeps the default deployment dependency free.

use crate::{ScoredKey, StoredVector, VectorError, VectorResult, VectorStore};
use async_trait::async_trait;
use skillbridge_embeddings::cosine_similarity;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Keeps every vector in a map and scans it on each query.
///
/// ```rust
/// use skillbridge_vectors::{InMemoryStore, StoredVector, VectorStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new(2);
///     store.upsert(vec![
///         StoredVector::new("Python", vec![1.0, 0.0]),
///         StoredVector::new("Anatomy", vec![0.0, 1.0]),
///     ]).await?;
///
///     let hits = store.nearest(&[0.9, 0.1], 1).await?;
///     assert_eq!(hits[0].key, "Python");
///     Ok(())
/// }
/// ```
pub struct InMemoryStore {
    dimension: usize,
    entries: RwLock<HashMap<String, StoredVector>>,
}

impl InMemoryStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn expect_dimension(&self, actual: usize) -> VectorResult<()> {
        if actual == self.dimension {
            Ok(())
        } else {
            Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual,
            })
        }
    }

    fn read(&self) -> VectorResult<RwLockReadGuard<'_, HashMap<String, StoredVector>>> {
        self.entries
            .read()
            .map_err(|_| VectorError::Connection("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> VectorResult<RwLockWriteGuard<'_, HashMap<String, StoredVector>>> {
        self.entries
            .write()
            .map_err(|_| VectorError::Connection("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn upsert(&self, entries: Vec<StoredVector>) -> VectorResult<()> {
        // Reject the whole batch before touching the map.
        for entry in &entries {
            self.expect_dimension(entry.vector.len())?;
        }
        let mut map = self.write()?;
        map.extend(entries.into_iter().map(|e| (e.key.clone(), e)));
        Ok(())
    }

    async fn nearest(&self, probe: &[f32], k: usize) -> VectorResult<Vec<ScoredKey>> {
        self.expect_dimension(probe.len())?;
        let map = self.read()?;

        let mut hits: Vec<ScoredKey> = map
            .values()
            .map(|entry| ScoredKey {
                key: entry.key.clone(),
                cosine: cosine_similarity(probe, &entry.vector),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.cosine
                .partial_cmp(&a.cosine)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.key.cmp(&b.key))
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn fetch(&self, keys: &[&str]) -> VectorResult<Vec<StoredVector>> {
        let map = self.read()?;
        Ok(keys.iter().filter_map(|key| map.get(*key).cloned()).collect())
    }

    async fn len(&self) -> VectorResult<usize> {
        Ok(self.read()?.len())
    }
}
