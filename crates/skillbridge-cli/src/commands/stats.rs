//! Show catalog and graph statistics.

use anyhow::Result;
use colored::Colorize;

use super::Engine;
use crate::config::Config;

pub async fn run(config: &Config) -> Result<()> {
    let engine = Engine::build(config, false).await?;

    let catalog = engine.catalog.stats();
    let counts = engine.graph.counts().await?;
    let indexed = engine.index.len().await?;
    let report = &engine.report;

    println!("{}", "Skillbridge Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Graph".blue().bold());
    println!("  Backend:           {}", engine.graph.name().cyan());
    println!(
        "  Skills:            {} {}",
        counts.skills.to_string().cyan(),
        format!("(catalog: {})", catalog.skills).dimmed()
    );
    println!(
        "  Courses:           {} {}",
        counts.courses.to_string().cyan(),
        format!("(catalog: {})", catalog.courses).dimmed()
    );
    println!(
        "  Applications:      {} {}",
        counts.applications.to_string().cyan(),
        format!("(catalog: {})", catalog.applications).dimmed()
    );
    println!(
        "  Teaches edges:     {} {}",
        counts.teaches.to_string().cyan(),
        format!("(catalog: {})", catalog.teaches).dimmed()
    );
    println!(
        "  Develops edges:    {} {}",
        counts.develops.to_string().cyan(),
        format!("(catalog: {})", catalog.develops).dimmed()
    );
    println!();

    println!("{}", "Retrieval".blue().bold());
    println!("  Indexed skills:    {}", indexed.to_string().cyan());
    println!("  Active skills:     {}", counts.active_skills.to_string().cyan());
    let inactive = counts.skills.saturating_sub(counts.active_skills);
    println!("  Unreachable:       {}", inactive.to_string().yellow());
    println!();

    println!("{}", "Load Report".blue().bold());
    if report.is_clean() {
        println!("  {} every catalog row loaded", "✓".green());
    } else {
        println!(
            "  Skipped courses:   {}",
            report.skipped_courses.len().to_string().yellow()
        );
        for code in &report.skipped_courses {
            println!("    {} {}", "•".yellow(), code);
        }
        println!(
            "  Skipped edges:     {}",
            report.skipped_edges.len().to_string().yellow()
        );
        for reason in &report.skipped_edges {
            println!("    {} {}", "•".yellow(), reason);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE;

    #[tokio::test]
    async fn reports_on_the_starter_project() {
        let dir = tempfile::tempdir().unwrap();
        crate::commands::init::run(Some(dir.path().display().to_string())).unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();

        run(&config).await.unwrap();
    }
}
