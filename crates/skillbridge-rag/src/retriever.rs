//! The hybrid retriever.
//!
//! Two sequential passes:
//!
//! 1. **Direct.** Related skills from the vector index, resolved to
//!    applications through develops edges.
//! 2. **Semantic bridge.** Only when the direct pass is sparse. The query is
//!    ranked against the active skills (skills some application develops);
//!    those above a similarity floor are resolved to applications, and each
//!    new application's score is multiplied by the similarity of its best
//!    bridging skill.
//!
//! A direct hit is never replaced by a bridged one.

use crate::cache::ActiveSkillCache;
use crate::config::{BridgeFailurePolicy, RetrieverConfig};
use crate::error::{RetrievalError, RetrievalResult};
use crate::scoring::{best_bridge_skill, into_bridged, into_direct, CandidateSet};
use regex::Regex;
use serde::Serialize;
use skillbridge_core::types::RankedApplication;
use skillbridge_graph::EntityGraph;
use skillbridge_vectors::SkillIndex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};

static COURSE_CODE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(\d{2}-\d{3})\b").ok());

/// First course code (`dd-ddd`, e.g. `15-112`) mentioned in `text`.
pub fn detect_course_code(text: &str) -> Option<&str> {
    let re = COURSE_CODE.as_ref()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A recoverable problem during retrieval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetrievalWarning {
    /// The bridge pass failed; results are direct matches only.
    BridgePassFailed { error: String },
}

impl fmt::Display for RetrievalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalWarning::BridgePassFailed { error } => {
                write!(f, "semantic bridge failed, showing direct matches only: {}", error)
            }
        }
    }
}

/// Output of one retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Retrieval {
    /// Ranked candidates, best first.
    pub applications: Vec<RankedApplication>,
    /// Whether the bridge pass ran.
    pub bridge_attempted: bool,
    /// Course code whose taught skills drove the retrieval, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    pub warnings: Vec<RetrievalWarning>,
}

impl Retrieval {
    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    /// Whether a pass failed and the results are partial.
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Skill-mediated hybrid retriever over a skill index and an entity graph.
///
/// Cheap to share behind an `Arc`; every call is independent apart from the
/// active-skill cache.
pub struct HybridRetriever {
    index: Arc<dyn SkillIndex>,
    graph: Arc<dyn EntityGraph>,
    cache: Arc<ActiveSkillCache>,
    config: RetrieverConfig,
}

impl HybridRetriever {
    /// Validate `config` and load the active-skill cache from `graph`.
    pub async fn new(
        index: Arc<dyn SkillIndex>,
        graph: Arc<dyn EntityGraph>,
        config: RetrieverConfig,
    ) -> RetrievalResult<Self> {
        config.validate()?;
        let cache = Arc::new(ActiveSkillCache::load(Arc::clone(&graph)).await);
        Ok(Self {
            index,
            graph,
            cache,
            config,
        })
    }

    /// Use an existing cache, e.g. one shared between retrievers.
    pub fn with_cache(
        index: Arc<dyn SkillIndex>,
        graph: Arc<dyn EntityGraph>,
        cache: Arc<ActiveSkillCache>,
        config: RetrieverConfig,
    ) -> RetrievalResult<Self> {
        config.validate()?;
        Ok(Self {
            index,
            graph,
            cache,
            config,
        })
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ActiveSkillCache> {
        &self.cache
    }

    /// Retrieve with `default_top_k`.
    pub async fn retrieve_default(&self, query: &str) -> RetrievalResult<Retrieval> {
        self.retrieve(query, self.config.default_top_k).await
    }

    /// Run [`retrieve`](Self::retrieve) under a deadline. On expiry the
    /// outstanding calls are dropped.
    pub async fn retrieve_within(
        &self,
        query: &str,
        top_k: usize,
        deadline: Duration,
    ) -> RetrievalResult<Retrieval> {
        tokio::time::timeout(deadline, self.retrieve(query, top_k))
            .await
            .map_err(|_| RetrievalError::DeadlineExceeded(deadline))?
    }

    /// Hybrid retrieval for a free-text query.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> RetrievalResult<Retrieval> {
        let mut retrieval = Retrieval::default();
        if top_k == 0 {
            return Ok(retrieval);
        }

        let mut candidates = CandidateSet::new();

        let related = self
            .index
            .find_related(query, self.config.related_skill_k)
            .await?;
        if !related.is_empty() {
            let skills: Vec<String> = related.into_iter().map(|m| m.name).collect();
            for app in self.graph.apps_for_skills(&skills, top_k).await? {
                candidates.insert_direct(into_direct(app));
            }
            debug!(skills = skills.len(), direct = candidates.len(), "direct pass");
        } else {
            debug!("direct pass found no related skills");
        }

        if self.config.bridge_enabled() && candidates.len() < self.config.bridge_trigger {
            retrieval.bridge_attempted = true;
            info!(
                direct = candidates.len(),
                trigger = self.config.bridge_trigger,
                "low direct recall, attempting semantic bridge"
            );

            match self.bridge_pass(query, top_k).await {
                Ok(bridged) => {
                    let mut added = 0;
                    for app in bridged {
                        if candidates.merge_bridged(app) {
                            added += 1;
                        }
                    }
                    debug!(added, "bridge pass merged");
                }
                Err(e) => match self.config.on_bridge_error {
                    BridgeFailurePolicy::Fail => return Err(e),
                    BridgeFailurePolicy::Degrade => {
                        warn!(error = %e, "semantic bridge failed, returning direct matches only");
                        retrieval.warnings.push(RetrievalWarning::BridgePassFailed {
                            error: e.to_string(),
                        });
                    }
                },
            }
        }

        retrieval.applications = candidates.into_ranked(top_k);
        Ok(retrieval)
    }

    /// Bridged candidates, penalized and tagged, not yet merged.
    async fn bridge_pass(&self, query: &str, top_k: usize) -> RetrievalResult<Vec<RankedApplication>> {
        let active = self.cache.snapshot_or_refresh().await?;
        if active.is_empty() {
            debug!("no active skills, skipping bridge");
            return Ok(Vec::new());
        }

        let nearest = self
            .index
            .find_nearest_among(
                query,
                &active,
                self.config.bridge_skill_k,
                self.config.bridge_min_similarity,
            )
            .await?;
        if nearest.is_empty() {
            debug!(
                min_similarity = self.config.bridge_min_similarity,
                "no active skill close enough to bridge"
            );
            return Ok(Vec::new());
        }

        let names: Vec<String> = nearest.iter().map(|m| m.name.clone()).collect();
        let similarity: HashMap<String, f64> =
            nearest.into_iter().map(|m| (m.name, m.similarity)).collect();

        let bridged = self
            .graph
            .apps_for_skills(&names, top_k)
            .await?
            .into_iter()
            .filter_map(|app| {
                let (skill, sim) = best_bridge_skill(&app.matched_skills, &similarity)
                    .map(|(s, v)| (s.to_string(), v))?;
                Some(into_bridged(app, &skill, sim))
            })
            .collect();
        Ok(bridged)
    }

    /// Applications for the skills a course teaches. Still a two-hop walk
    /// through the skill layer; an unknown course yields nothing.
    pub async fn retrieve_for_course(
        &self,
        course_code: &str,
        top_k: usize,
    ) -> RetrievalResult<Retrieval> {
        let taught = self.graph.skills_for_course(course_code).await?;
        let skills: Vec<String> = taught.into_iter().map(|t| t.name).collect();
        let mut retrieval = self.direct_from_skills(&skills, top_k).await?;
        if !skills.is_empty() {
            retrieval.course = Some(course_code.to_string());
        }
        Ok(retrieval)
    }

    async fn direct_from_skills(&self, skills: &[String], top_k: usize) -> RetrievalResult<Retrieval> {
        let mut retrieval = Retrieval::default();
        if skills.is_empty() || top_k == 0 {
            return Ok(retrieval);
        }

        let mut candidates = CandidateSet::new();
        for app in self.graph.apps_for_skills(skills, top_k).await? {
            candidates.insert_direct(into_direct(app));
        }
        retrieval.applications = candidates.into_ranked(top_k);
        Ok(retrieval)
    }

    /// Course path when the query names a known course that teaches
    /// something, hybrid retrieval otherwise.
    pub async fn recommend(&self, query: &str, top_k: usize) -> RetrievalResult<Retrieval> {
        if let Some(code) = detect_course_code(query) {
            let taught = self.graph.skills_for_course(code).await?;
            if !taught.is_empty() {
                info!(course = code, skills = taught.len(), "recommending via course");
                let skills: Vec<String> = taught.into_iter().map(|t| t.name).collect();
                let mut retrieval = self.direct_from_skills(&skills, top_k).await?;
                retrieval.course = Some(code.to_string());
                return Ok(retrieval);
            }
            debug!(course = code, "course code not in graph, using hybrid retrieval");
        }
        self.retrieve(query, top_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_course_codes() {
        assert_eq!(detect_course_code("apps for 15-112 please"), Some("15-112"));
        assert_eq!(detect_course_code("95-729"), Some("95-729"));
        assert_eq!(detect_course_code("call 412-268-3000"), None);
        assert_eq!(detect_course_code("python"), None);
    }

    #[test]
    fn warning_display() {
        let warning = RetrievalWarning::BridgePassFailed {
            error: "index offline".into(),
        };
        assert!(warning.to_string().contains("index offline"));
    }
}
