//! Recommend applications for the skills a course teaches.

use anyhow::Result;
use colored::Colorize;

use super::{print_application, Engine};
use crate::config::Config;

pub async fn run(config: &Config, code: &str, top_k: Option<usize>) -> Result<()> {
    let engine = Engine::build(config, false).await?;
    let top_k = top_k.unwrap_or(config.retrieval.default_top_k);

    let taught = engine.graph.skills_for_course(code).await?;
    if taught.is_empty() {
        println!(
            "{} Course {} is unknown or teaches no skills",
            "•".yellow(),
            code.cyan()
        );
        return Ok(());
    }

    println!("{} Course {} teaches:", "→".blue(), code.cyan().bold());
    for skill in &taught {
        println!("    {} {}", skill.name, format!("({:.2})", skill.weight).dimmed());
    }
    println!();

    let retrieval = engine.retriever.retrieve_for_course(code, top_k).await?;
    if retrieval.is_empty() {
        println!("{} No application develops these skills", "•".yellow());
        return Ok(());
    }

    for (i, app) in retrieval.applications.iter().enumerate() {
        print_application(i + 1, app);
    }

    println!();
    println!(
        "{} {} results",
        "✓".green(),
        retrieval.len().to_string().cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE;

    #[tokio::test]
    async fn runs_for_known_and_unknown_courses() {
        let dir = tempfile::tempdir().unwrap();
        crate::commands::init::run(Some(dir.path().display().to_string())).unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();

        run(&config, "15-112", Some(3)).await.unwrap();
        run(&config, "00-000", None).await.unwrap();
    }
}
