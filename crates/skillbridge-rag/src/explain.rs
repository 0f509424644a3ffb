//! Boundary to the external ranker/explainer.
//!
//! An [`Explainer`] turns retrieved candidates into user-facing reasoning,
//! typically by prompting a language model with [`candidate_digest`]. When it
//! fails, [`explain_or_fallback`] answers with [`FallbackExplainer`] so the
//! user still gets the retrieved list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillbridge_core::types::{RankedApplication, RetrievalSource};
use thiserror::Error;
use tracing::warn;

pub const FALLBACK_REASONING: &str = "Matches your learning interests";

#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("Explainer unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed explainer response: {0}")]
    Malformed(String),
}

/// A retrieved application with the reasoning shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub app_id: String,
    pub name: String,
    pub category: String,
    pub matched_skills: Vec<String>,
    pub score: f64,
    pub retrieval_source: RetrievalSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_explanation: Option<String>,
    pub reasoning: String,
}

impl Recommendation {
    pub fn from_ranked(app: &RankedApplication, reasoning: impl Into<String>) -> Self {
        Self {
            app_id: app.app_id.clone(),
            name: app.name.clone(),
            category: app.category.clone(),
            matched_skills: app.matched_skills.clone(),
            score: app.score,
            retrieval_source: app.retrieval_source,
            bridge_explanation: app.bridge_explanation.clone(),
            reasoning: reasoning.into(),
        }
    }
}

/// Re-ranks and explains retrieved candidates.
///
/// Implementations must treat `bridge_explanation` as context to work into
/// the reasoning, not something to replace.
#[async_trait]
pub trait Explainer: Send + Sync {
    fn name(&self) -> &str;

    async fn explain(
        &self,
        query: &str,
        candidates: &[RankedApplication],
    ) -> Result<Vec<Recommendation>, ExplainError>;

    /// One-line restatement of what the user wants to learn.
    async fn summarize_query(&self, query: &str) -> Result<String, ExplainError> {
        Ok(format!("Learning interest: {}", query.trim()))
    }
}

/// Candidate listing handed to the explainer, one line per application:
///
/// ```text
/// - CodeVR (Education): matches Programming [Note: Related to 'Programming']
/// ```
pub fn candidate_digest(apps: &[RankedApplication]) -> String {
    apps.iter()
        .map(|app| {
            let mut line = format!(
                "- {} ({}): matches {}",
                app.name,
                app.category,
                app.matched_skills.join(", ")
            );
            if app.is_bridged() {
                let note = app.bridge_explanation.as_deref().unwrap_or("Indirect match");
                line.push_str(&format!(" [Note: {}]", note));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Explainer that never fails: generic reasoning, plus the bridge note for
/// bridged candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackExplainer;

impl FallbackExplainer {
    pub fn reasoning_for(app: &RankedApplication) -> String {
        match (&app.retrieval_source, &app.bridge_explanation) {
            (RetrievalSource::SemanticBridge, Some(note)) => {
                format!("{} ({})", FALLBACK_REASONING, note)
            }
            _ => FALLBACK_REASONING.to_string(),
        }
    }

    pub fn recommend(candidates: &[RankedApplication]) -> Vec<Recommendation> {
        candidates
            .iter()
            .map(|app| Recommendation::from_ranked(app, Self::reasoning_for(app)))
            .collect()
    }
}

#[async_trait]
impl Explainer for FallbackExplainer {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn explain(
        &self,
        _query: &str,
        candidates: &[RankedApplication],
    ) -> Result<Vec<Recommendation>, ExplainError> {
        Ok(Self::recommend(candidates))
    }
}

/// Ask `explainer`; on failure log it and fall back to generic reasoning.
///
/// Candidates the explainer left out are appended with fallback reasoning, so
/// every retrieved application is always returned.
pub async fn explain_or_fallback(
    explainer: &dyn Explainer,
    query: &str,
    candidates: &[RankedApplication],
) -> Vec<Recommendation> {
    if candidates.is_empty() {
        return Vec::new();
    }

    match explainer.explain(query, candidates).await {
        Ok(mut explained) => {
            let missing: Vec<Recommendation> = candidates
                .iter()
                .filter(|app| !explained.iter().any(|r| r.app_id == app.app_id))
                .map(|app| Recommendation::from_ranked(app, FallbackExplainer::reasoning_for(app)))
                .collect();
            explained.extend(missing);
            explained
        }
        Err(e) => {
            warn!(explainer = explainer.name(), error = %e, "explainer failed, using fallback reasoning");
            FallbackExplainer::recommend(candidates)
        }
    }
}
