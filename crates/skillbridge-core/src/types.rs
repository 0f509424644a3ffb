//! Shared types used across all skillbridge crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Sentinel the upstream scrapers write when a course page has no description.
pub const PLACEHOLDER_DESCRIPTION: &str = "not available";

/// The closed set of skill categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Soft,
    Domain,
}

impl SkillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Technical => "technical",
            SkillCategory::Soft => "soft",
            SkillCategory::Domain => "domain",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(SkillCategory::Technical),
            "soft" => Ok(SkillCategory::Soft),
            "domain" => Ok(SkillCategory::Domain),
            other => Err(ConfigError::InvalidValue {
                field: "category".to_string(),
                value: other.to_string(),
                reason: "expected one of technical, soft, domain".to_string(),
            }),
        }
    }
}

/// Normalize a skill name into its key form: trimmed, inner whitespace collapsed.
///
/// Case is preserved ("Python" and "python" are distinct keys upstream and the
/// extraction stage is responsible for merging them).
pub fn normalize_skill_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A skill in the shared vocabulary. Identified by its normalized name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// How many source documents mentioned this skill during extraction.
    #[serde(default)]
    pub source_count: u32,
    /// Importance weight in [0, 1].
    #[serde(default)]
    pub weight: f64,
}

impl Skill {
    pub fn new(name: impl AsRef<str>, category: SkillCategory) -> Self {
        Self {
            name: normalize_skill_name(name.as_ref()),
            category,
            aliases: Vec::new(),
            source_count: 0,
            weight: 0.0,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_source_count(mut self, count: u32) -> Self {
        self.source_count = count;
        self
    }

    /// Text fed to the embedder when indexing this skill.
    ///
    /// `"Python. Also known as: py, python3. Category: technical"`
    pub fn embedding_text(&self) -> String {
        if self.aliases.is_empty() {
            format!("{}. Category: {}", self.name, self.category)
        } else {
            format!(
                "{}. Also known as: {}. Category: {}",
                self.name,
                self.aliases.join(", "),
                self.category
            )
        }
    }
}

/// A university course. Identified by its course code (e.g. `15-112`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub units: Option<f64>,
}

impl Course {
    /// Whether the description is real text rather than empty or a scraper placeholder.
    pub fn has_usable_description(&self) -> bool {
        let description = self.description.trim();
        !description.is_empty()
            && !description
                .to_lowercase()
                .contains(PLACEHOLDER_DESCRIPTION)
    }
}

/// A recommendable immersive-learning application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub app_id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub price: Option<String>,
}

/// Course → Skill edge: how central the skill is to the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teaches {
    pub course_code: String,
    pub skill: String,
    pub weight: f64,
}

/// Application → Skill edge: how central the skill is to the application.
///
/// This is the only way an application becomes reachable from a skill. There
/// is deliberately no course → application edge type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Develops {
    pub app_id: String,
    pub skill: String,
    pub weight: f64,
}

/// A skill a course teaches, with the edge weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaughtSkill {
    pub name: String,
    pub weight: f64,
}

/// One application found by resolving skills through "develops" edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppMatch {
    pub app_id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Requested skills this application develops, in request order.
    pub matched_skills: Vec<String>,
    /// Sum of the develops-edge weights of `matched_skills`.
    pub score: f64,
}

/// Which retrieval strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
    DirectSkillMatch,
    SemanticBridge,
}

impl RetrievalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalSource::DirectSkillMatch => "direct_skill_match",
            RetrievalSource::SemanticBridge => "semantic_bridge",
        }
    }
}

impl fmt::Display for RetrievalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked candidate handed to the ranking/explanation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedApplication {
    pub app_id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub matched_skills: Vec<String>,
    /// Ranking score. Only meaningful relative to other results of the same call.
    pub score: f64,
    /// Graph score before any bridge penalty.
    pub graph_score: f64,
    pub retrieval_source: RetrievalSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_explanation: Option<String>,
}

impl RankedApplication {
    pub fn is_bridged(&self) -> bool {
        self.retrieval_source == RetrievalSource::SemanticBridge
    }
}

/// Checks that an edge or importance weight lies in [0, 1].
pub fn check_weight(field: &str, weight: f64) -> Result<f64, ConfigError> {
    if weight.is_finite() && (0.0..=1.0).contains(&weight) {
        Ok(weight)
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 1.0,
            value: weight,
        })
    }
}
