//! List the skills at least one application develops.

use anyhow::Result;
use colored::Colorize;

use super::Engine;
use crate::config::Config;

pub async fn run(config: &Config) -> Result<()> {
    let engine = Engine::build(config, false).await?;

    let active = engine.retriever.cache().snapshot_or_refresh().await?;
    if active.is_empty() {
        println!("{} No application develops any skill yet", "•".yellow());
        return Ok(());
    }

    let mut names: Vec<&String> = active.iter().collect();
    names.sort();

    println!("{}", "Active Skills".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    for name in &names {
        println!("  {}", name);
    }

    println!();
    println!(
        "{} {} of {} skills are reachable by the semantic bridge",
        "✓".green(),
        names.len().to_string().cyan(),
        engine.catalog.skills.len()
    );

    Ok(())
}
