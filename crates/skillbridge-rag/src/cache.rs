//! The active-skill cache.
//!
//! Holds the set of skills that at least one application develops, which is
//! what the bridge pass ranks against. The set is loaded once and refreshed
//! on demand; between refreshes it may lag the graph by one re-ingestion.
//!
//! Readers take a cheap `Arc` snapshot and never wait for a refresh. Refreshes
//! are single-flight: callers that queue behind a running refresh reuse its
//! result instead of querying the graph again.

use skillbridge_graph::{EntityGraph, GraphResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

pub struct ActiveSkillCache {
    graph: Arc<dyn EntityGraph>,
    snapshot: RwLock<Arc<HashSet<String>>>,
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
}

impl ActiveSkillCache {
    /// An unloaded cache. The first `snapshot_or_refresh` fills it.
    pub fn empty(graph: Arc<dyn EntityGraph>) -> Self {
        Self {
            graph,
            snapshot: RwLock::new(Arc::new(HashSet::new())),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Build the cache and load it from the graph. A failed load is logged and
    /// leaves the cache empty.
    pub async fn load(graph: Arc<dyn EntityGraph>) -> Self {
        let cache = Self::empty(graph);
        match cache.refresh().await {
            Ok(skills) => info!(active_skills = skills.len(), "loaded active skills"),
            Err(e) => warn!(error = %e, "failed to load active skills, starting empty"),
        }
        cache
    }

    /// Current contents.
    pub async fn snapshot(&self) -> Arc<HashSet<String>> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Number of completed refreshes.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Recompute the set from the graph and publish it.
    pub async fn refresh(&self) -> GraphResult<Arc<HashSet<String>>> {
        self.refresh_after(self.generation()).await
    }

    /// Refresh unless another refresh completed since generation `seen`.
    async fn refresh_after(&self, seen: u64) -> GraphResult<Arc<HashSet<String>>> {
        let _guard = self.refresh_lock.lock().await;
        if self.generation() != seen {
            return Ok(self.snapshot().await);
        }

        let fresh = Arc::new(self.graph.active_skills().await?);
        *self.snapshot.write().await = Arc::clone(&fresh);
        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(fresh)
    }

    /// The current set, refreshed once first if it is empty.
    pub async fn snapshot_or_refresh(&self) -> GraphResult<Arc<HashSet<String>>> {
        // Generation is read before the snapshot so a refresh finishing in
        // between is still seen.
        let seen = self.generation();
        let current = self.snapshot().await;
        if !current.is_empty() {
            return Ok(current);
        }

        info!("active-skill cache is empty, refreshing from graph");
        let refreshed = self.refresh_after(seen).await?;
        info!(active_skills = refreshed.len(), "active-skill cache refreshed");
        Ok(refreshed)
    }
}
