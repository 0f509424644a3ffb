//! Show the skills closest to a text.

use anyhow::Result;
use colored::Colorize;
use skillbridge::prelude::*;

use super::Engine;
use crate::config::Config;

pub async fn run(config: &Config, text: &str, top_k: usize) -> Result<()> {
    let engine = Engine::build(config, false).await?;

    let related = engine.index.find_related(text, top_k).await?;
    if related.is_empty() {
        println!("{} No related skills for: {}", "•".yellow(), text.cyan());
        return Ok(());
    }

    let active = engine.retriever.cache().snapshot().await;

    println!("{} Skills related to {}:", "→".blue(), text.cyan().bold());
    println!();
    for (i, skill) in related.iter().enumerate() {
        let marker = if active.contains(&skill.name) {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!(
            "  {} {} {} {}",
            format!("{}.", i + 1).blue(),
            marker,
            skill.name.white().bold(),
            format!("({:.3})", skill.similarity).dimmed()
        );
    }

    println!();
    println!(
        "{} = developed by at least one application",
        "●".green()
    );

    Ok(())
}
