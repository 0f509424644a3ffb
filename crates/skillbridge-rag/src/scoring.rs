//! Score composition, candidate merging and final ordering.
//!
//! Everything here is a pure function over literal values so the merge rules
//! can be tested without an index or a graph.

use skillbridge_core::types::{AppMatch, RankedApplication, RetrievalSource};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Down-weight a bridged application's graph score by the similarity of the
/// skill that bridged it.
pub fn penalize_bridged(score: f64, best_bridge_similarity: f64) -> f64 {
    score * best_bridge_similarity
}

/// The matched skill with the highest bridge similarity. Ties go to the skill
/// listed first. Skills with zero similarity never explain a match.
pub fn best_bridge_skill<'a>(
    matched_skills: &'a [String],
    bridge_similarity: &HashMap<String, f64>,
) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for skill in matched_skills {
        let Some(&similarity) = bridge_similarity.get(skill) else {
            continue;
        };
        if similarity > best.map_or(0.0, |(_, s)| s) {
            best = Some((skill.as_str(), similarity));
        }
    }
    best
}

pub fn bridge_explanation(skill: &str) -> String {
    format!("Related to '{}'", skill)
}

/// Tag a graph match as a direct hit.
pub fn into_direct(app: AppMatch) -> RankedApplication {
    RankedApplication {
        app_id: app.app_id,
        name: app.name,
        category: app.category,
        description: app.description,
        matched_skills: app.matched_skills,
        score: app.score,
        graph_score: app.score,
        retrieval_source: RetrievalSource::DirectSkillMatch,
        bridge_explanation: None,
    }
}

/// Tag a graph match as bridged through `skill` and apply the penalty.
pub fn into_bridged(app: AppMatch, skill: &str, similarity: f64) -> RankedApplication {
    RankedApplication {
        app_id: app.app_id,
        name: app.name,
        category: app.category,
        description: app.description,
        matched_skills: app.matched_skills,
        score: penalize_bridged(app.score, similarity),
        graph_score: app.score,
        retrieval_source: RetrievalSource::SemanticBridge,
        bridge_explanation: Some(bridge_explanation(skill)),
    }
}

/// Candidates of one retrieval, keyed by application name.
#[derive(Debug, Default)]
pub struct CandidateSet {
    by_name: HashMap<String, RankedApplication>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a direct hit. A later direct hit with the same name replaces the
    /// earlier one.
    pub fn insert_direct(&mut self, app: RankedApplication) {
        self.by_name.insert(app.name.clone(), app);
    }

    /// Insert a bridged candidate unless the name is already present.
    /// Returns whether it was added.
    pub fn merge_bridged(&mut self, app: RankedApplication) -> bool {
        if self.by_name.contains_key(&app.name) {
            return false;
        }
        self.by_name.insert(app.name.clone(), app);
        true
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Sorted, truncated result list.
    pub fn into_ranked(self, top_k: usize) -> Vec<RankedApplication> {
        finalize(self.by_name.into_values().collect(), top_k)
    }
}

/// Merge both passes: every direct hit, then bridged candidates whose name no
/// direct hit already holds. Result is sorted.
pub fn merge_candidates(
    direct: Vec<RankedApplication>,
    bridged: Vec<RankedApplication>,
) -> Vec<RankedApplication> {
    let mut set = CandidateSet::new();
    for app in direct {
        set.insert_direct(app);
    }
    for app in bridged {
        set.merge_bridged(app);
    }
    let len = set.len();
    set.into_ranked(len)
}

/// Score descending, then name ascending.
pub fn sort_descending_by_score(apps: &mut [RankedApplication]) {
    apps.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn finalize(mut apps: Vec<RankedApplication>, top_k: usize) -> Vec<RankedApplication> {
    sort_descending_by_score(&mut apps);
    apps.truncate(top_k);
    apps
}
