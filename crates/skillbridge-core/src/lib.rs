//! # Skillbridge Core
//!
//! Core types for skill-mediated retrieval of immersive-learning applications.
//!
//! The data model is a three-kind entity graph:
//!
//! - **Course** --teaches--> **Skill**
//! - **Application** --develops--> **Skill**
//!
//! There is no course → application edge. Every course-to-application
//! relevance judgement goes through shared skills.
//!
//! ## Quick Start
//!
//! ```rust
//! use skillbridge_core::prelude::*;
//!
//! let skill = Skill::new("Python", SkillCategory::Technical).with_aliases(["py"]);
//! assert_eq!(skill.embedding_text(), "Python. Also known as: py. Category: technical");
//! ```

pub mod catalog;
pub mod error;
pub mod prelude;
pub mod types;
