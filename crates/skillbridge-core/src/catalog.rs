//! The catalog: the interchange document produced by the offline ingestion
//! pipeline and consumed by the graph and index loaders.
//!
//! A catalog is a single JSON object:
//!
//! ```json
//! {
//!   "skills": [{"name": "Python", "category": "technical", "aliases": ["py"]}],
//!   "courses": [{"code": "15-112", "title": "Fundamentals of Programming", "description": "..."}],
//!   "applications": [{"app_id": "codevr", "name": "CodeVR", "category": "Education"}],
//!   "teaches": [{"course_code": "15-112", "skill": "Python", "weight": 0.8}],
//!   "develops": [{"app_id": "codevr", "skill": "Python", "weight": 0.9}]
//! }
//! ```

use crate::error::{CatalogError, CoreError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// All entities and edges of one ingestion snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub teaches: Vec<Teaches>,
    #[serde(default)]
    pub develops: Vec<Develops>,
}

/// Entity and edge counts for a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub skills: usize,
    pub courses: usize,
    pub applications: usize,
    pub teaches: usize,
    pub develops: usize,
}

impl Catalog {
    /// Parse a catalog from JSON text. Skill names are normalized.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut catalog: Catalog = serde_json::from_str(json)?;
        catalog.normalize();
        catalog.check_unique_keys()?;
        Ok(catalog)
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::Catalog(CatalogError::NotFound(
                path.display().to_string(),
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            skills: self.skills.len(),
            courses: self.courses.len(),
            applications: self.applications.len(),
            teaches: self.teaches.len(),
            develops: self.develops.len(),
        }
    }

    fn normalize(&mut self) {
        for skill in &mut self.skills {
            skill.name = normalize_skill_name(&skill.name);
        }
        for edge in &mut self.teaches {
            edge.skill = normalize_skill_name(&edge.skill);
        }
        for edge in &mut self.develops {
            edge.skill = normalize_skill_name(&edge.skill);
        }
    }

    fn check_unique_keys(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for skill in &self.skills {
            if !seen.insert(skill.name.as_str()) {
                return Err(CoreError::duplicate("skill", &skill.name));
            }
        }
        seen.clear();
        for course in &self.courses {
            if !seen.insert(course.code.as_str()) {
                return Err(CoreError::duplicate("course", &course.code));
            }
        }
        seen.clear();
        for app in &self.applications {
            if !seen.insert(app.app_id.as_str()) {
                return Err(CoreError::duplicate("application", &app.app_id));
            }
        }
        Ok(())
    }
}
