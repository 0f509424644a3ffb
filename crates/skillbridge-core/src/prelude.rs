//! Skillbridge core prelude.
//!
//! ```rust
//! use skillbridge_core::prelude::*;
//! ```

pub use crate::catalog::{Catalog, CatalogStats};
pub use crate::error::{CatalogError, ConfigError, CoreError};
pub use crate::types::{
    check_weight, normalize_skill_name, AppMatch, Application, Course, Develops,
    RankedApplication, RetrievalSource, Skill, SkillCategory, TaughtSkill, Teaches,
    PLACEHOLDER_DESCRIPTION,
};
