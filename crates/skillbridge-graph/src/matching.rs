//! Grouping of develops-edge rows into per-application matches.
//!
//! Backends produce `(application, skill, weight)` rows in whatever order
//! their storage yields them; [`MatchAccumulator`] turns those rows into the
//! deterministic `AppMatch` list that `apps_for_skills` returns.

use skillbridge_core::types::{AppMatch, Application};
use std::cmp::Ordering;
use std::collections::HashMap;

struct PendingMatch {
    app_id: String,
    name: String,
    category: String,
    description: String,
    // (position in the request, skill, edge weight)
    hits: Vec<(usize, String, f64)>,
}

/// Collects develops rows for one `apps_for_skills` request.
pub struct MatchAccumulator {
    positions: HashMap<String, usize>,
    pending: HashMap<String, PendingMatch>,
}

impl MatchAccumulator {
    /// Start a request. Duplicate skills keep their first position.
    pub fn new(skills: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(skills.len());
        for (i, skill) in skills.iter().enumerate() {
            positions.entry(skill.clone()).or_insert(i);
        }
        Self {
            positions,
            pending: HashMap::new(),
        }
    }

    /// Requested skills, deduplicated, in request order.
    pub fn requested(&self) -> Vec<&str> {
        let mut skills: Vec<(&str, usize)> = self
            .positions
            .iter()
            .map(|(name, pos)| (name.as_str(), *pos))
            .collect();
        skills.sort_by_key(|(_, pos)| *pos);
        skills.into_iter().map(|(name, _)| name).collect()
    }

    pub fn is_requested(&self, skill: &str) -> bool {
        self.positions.contains_key(skill)
    }

    /// Record one develops edge. Rows for skills outside the request are ignored,
    /// as are repeats of an already recorded (application, skill) pair.
    pub fn add(&mut self, app: &Application, skill: &str, weight: f64) {
        self.add_row(&app.app_id, &app.name, &app.category, &app.description, skill, weight);
    }

    pub fn add_row(
        &mut self,
        app_id: &str,
        name: &str,
        category: &str,
        description: &str,
        skill: &str,
        weight: f64,
    ) {
        let Some(&position) = self.positions.get(skill) else {
            return;
        };
        let entry = self
            .pending
            .entry(app_id.to_string())
            .or_insert_with(|| PendingMatch {
                app_id: app_id.to_string(),
                name: name.to_string(),
                category: category.to_string(),
                description: description.to_string(),
                hits: Vec::new(),
            });
        if entry.hits.iter().any(|(_, s, _)| s == skill) {
            return;
        }
        entry.hits.push((position, skill.to_string(), weight));
    }

    /// Build the ranked, truncated match list.
    pub fn finish(self, top_k: usize) -> Vec<AppMatch> {
        let mut matches: Vec<AppMatch> = self
            .pending
            .into_values()
            .map(|mut pending| {
                pending.hits.sort_by_key(|(pos, _, _)| *pos);
                // Summed in request order so equal inputs give bit-equal scores.
                let score = pending.hits.iter().map(|(_, _, w)| *w).sum();
                AppMatch {
                    app_id: pending.app_id,
                    name: pending.name,
                    category: pending.category,
                    description: pending.description,
                    matched_skills: pending.hits.into_iter().map(|(_, s, _)| s).collect(),
                    score,
                }
            })
            .collect();

        matches.sort_by(compare_matches);
        matches.truncate(top_k);
        matches
    }
}

/// Score descending, then matched-skill count descending, then app id ascending.
pub fn compare_matches(a: &AppMatch, b: &AppMatch) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.matched_skills.len().cmp(&a.matched_skills.len()))
        .then_with(|| a.app_id.cmp(&b.app_id))
}
