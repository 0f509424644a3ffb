//! Initialize a new Skillbridge project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};

/// Starter catalog so a fresh project answers queries immediately.
const SAMPLE_CATALOG: &str = r#"{
  "skills": [
    {"name": "Python", "category": "technical", "aliases": ["py", "python3"], "source_count": 14, "weight": 0.9},
    {"name": "Programming", "category": "technical", "aliases": ["coding"], "source_count": 22, "weight": 0.95},
    {"name": "Data Visualization", "category": "technical", "aliases": ["charts"], "source_count": 6, "weight": 0.7},
    {"name": "Anatomy", "category": "domain", "source_count": 4, "weight": 0.6},
    {"name": "Public Speaking", "category": "soft", "aliases": ["presentation"], "source_count": 5, "weight": 0.5},
    {"name": "Spatial Reasoning", "category": "soft", "source_count": 3, "weight": 0.4}
  ],
  "courses": [
    {"code": "15-112", "title": "Fundamentals of Programming and Computer Science", "department": "Computer Science",
     "description": "Introductory programming in Python with an emphasis on problem solving.", "units": 12},
    {"code": "05-499", "title": "Data Visualization", "department": "Human-Computer Interaction",
     "description": "Designing charts and interactive graphics that communicate data.", "units": 9}
  ],
  "applications": [
    {"app_id": "codevr", "name": "CodeVR", "category": "Education",
     "description": "Write and run code on floating panels.", "features": ["live editor"], "rating": 4.3},
    {"app_id": "chartroom", "name": "ChartRoom", "category": "Productivity",
     "description": "Walk through your datasets as 3D charts.", "rating": 4.1},
    {"app_id": "bodyworks", "name": "BodyWorks VR", "category": "Medical",
     "description": "Explore a life-size human body layer by layer.", "rating": 4.6},
    {"app_id": "stagefright", "name": "StageFright", "category": "Education",
     "description": "Rehearse talks in front of a virtual audience.", "rating": 4.0}
  ],
  "teaches": [
    {"course_code": "15-112", "skill": "Python", "weight": 0.9},
    {"course_code": "15-112", "skill": "Programming", "weight": 0.8},
    {"course_code": "05-499", "skill": "Data Visualization", "weight": 0.9}
  ],
  "develops": [
    {"app_id": "codevr", "skill": "Programming", "weight": 0.9},
    {"app_id": "codevr", "skill": "Python", "weight": 0.6},
    {"app_id": "chartroom", "skill": "Data Visualization", "weight": 0.8},
    {"app_id": "bodyworks", "skill": "Anatomy", "weight": 0.9},
    {"app_id": "bodyworks", "skill": "Spatial Reasoning", "weight": 0.4},
    {"app_id": "stagefright", "skill": "Public Speaking", "weight": 0.85}
  ]
}
"#;

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing Skillbridge project...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    // Create default config
    let config = Config::default();
    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        config.save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    // Create starter catalog
    let catalog_path = base_path.join(&config.data.catalog);
    if !catalog_path.exists() {
        std::fs::write(&catalog_path, SAMPLE_CATALOG)
            .with_context(|| format!("Failed to write {}", catalog_path.display()))?;
        println!("  {} Created {}", "✓".green(), catalog_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), catalog_path.display());
    }

    println!();
    println!("{} Skillbridge project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} edit {} or point [data].catalog at your own", "1.".blue(), catalog_path.display());
    println!("  {} skillbridge query \"learn to code\"", "2.".blue());
    println!("  {} skillbridge stats", "3.".blue());

    Ok(())
}
