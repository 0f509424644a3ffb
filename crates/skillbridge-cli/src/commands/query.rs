//! Recommend applications for a learning goal.

use anyhow::Result;
use colored::Colorize;
use skillbridge::prelude::*;

use super::{print_application, print_warnings, Engine};
use crate::config::Config;

pub async fn run(
    config: &Config,
    query: &str,
    top_k: Option<usize>,
    json: bool,
    explain: bool,
) -> Result<()> {
    let engine = Engine::build(config, json).await?;
    let top_k = top_k.unwrap_or(config.retrieval.default_top_k);

    let retrieval = engine.retriever.recommend(query, top_k).await?;

    if json {
        let output = if explain {
            let recommendations =
                explain_or_fallback(&FallbackExplainer, query, &retrieval.applications).await;
            serde_json::to_string_pretty(&recommendations)?
        } else {
            serde_json::to_string_pretty(&retrieval)?
        };
        println!("{}", output);
        return Ok(());
    }

    print_warnings(&retrieval);

    if retrieval.is_empty() {
        println!("{} No applications found for: {}", "•".yellow(), query.cyan());
        return Ok(());
    }

    println!("{} Applications for {}:", "→".blue(), query.cyan().bold());
    if let Some(code) = &retrieval.course {
        println!("  {}", format!("(course {} detected)", code).dimmed());
    }
    println!();

    let recommendations = if explain {
        explain_or_fallback(&FallbackExplainer, query, &retrieval.applications).await
    } else {
        Vec::new()
    };

    for (i, app) in retrieval.applications.iter().enumerate() {
        print_application(i + 1, app);
        if let Some(rec) = recommendations.iter().find(|r| r.app_id == app.app_id) {
            println!("      {} {}", "Why:".blue(), rec.reasoning);
        }
    }

    if explain {
        println!();
        println!("{}", "Explainer input".white().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("{}", FallbackExplainer.summarize_query(query).await?);
        println!("{}", candidate_digest(&retrieval.applications));
    }

    let bridged = retrieval
        .applications
        .iter()
        .filter(|app| app.is_bridged())
        .count();
    println!();
    println!(
        "{} {} results ({} via semantic bridge)",
        "✓".green(),
        retrieval.len().to_string().cyan(),
        bridged.to_string().yellow()
    );

    Ok(())
}
