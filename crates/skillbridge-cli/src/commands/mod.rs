//! CLI command implementations.

pub mod active;
pub mod course;
pub mod init;
pub mod query;
pub mod skills;
pub mod stats;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use skillbridge::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::config::{Config, IndexConfig};

/// Everything a command needs, built from the configured catalog.
pub struct Engine {
    pub catalog: Catalog,
    pub report: LoadReport,
    pub graph: Arc<dyn EntityGraph>,
    pub index: Arc<SkillVectorIndex>,
    pub retriever: HybridRetriever,
}

impl Engine {
    /// Load the catalog, build the graph and the skill index, and warm the
    /// active-skill cache. `quiet` hides the progress bar.
    pub async fn build(config: &Config, quiet: bool) -> Result<Self> {
        let pb = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(4)
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );

        pb.set_message("loading catalog");
        let catalog_path = config.catalog_path();
        if !catalog_path.exists() {
            pb.finish_and_clear();
            bail!(
                "No catalog at {}. Run {} or set [data].catalog.",
                catalog_path.display(),
                "skillbridge init".cyan()
            );
        }
        let catalog = Catalog::load(&catalog_path)
            .with_context(|| format!("Failed to load catalog: {}", catalog_path.display()))?;
        pb.inc(1);

        pb.set_message("building graph");
        let (graph, report) = open_graph(config, &catalog)?;
        pb.inc(1);

        pb.set_message("indexing skills");
        let embedder = build_embedder(&config.index)?;
        let store = Arc::new(InMemoryStore::new(embedder.dimension()));
        let index = Arc::new(SkillVectorIndex::new(store, embedder));
        index
            .index_skills(&catalog.skills)
            .await
            .context("Failed to index skills")?;
        pb.inc(1);

        pb.set_message("loading active skills");
        let retriever = HybridRetriever::new(
            Arc::clone(&index) as Arc<dyn SkillIndex>,
            Arc::clone(&graph),
            config.retrieval.clone(),
        )
        .await?;
        pb.inc(1);
        pb.finish_and_clear();

        debug!(
            graph = graph.name(),
            skills = catalog.skills.len(),
            clean = report.is_clean(),
            "engine ready"
        );

        Ok(Self {
            catalog,
            report,
            graph,
            index,
            retriever,
        })
    }
}

fn open_graph(config: &Config, catalog: &Catalog) -> Result<(Arc<dyn EntityGraph>, LoadReport)> {
    match config.sqlite_path() {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let graph = SqliteGraph::open(&path)
                .with_context(|| format!("Failed to open graph database: {}", path.display()))?;
            let report = graph.import_catalog(catalog)?;
            Ok((Arc::new(graph), report))
        }
        #[cfg(not(feature = "sqlite"))]
        Some(path) => bail!(
            "[data].sqlite is set to {} but this build has no `sqlite` feature",
            path.display()
        ),
        None => {
            let (graph, report) = InMemoryGraph::from_catalog(catalog);
            Ok((Arc::new(graph), report))
        }
    }
}

fn build_embedder(index: &IndexConfig) -> Result<Arc<dyn Embedder>> {
    match index.embedder.as_str() {
        "hashing" => Ok(Arc::new(HashingEmbedder::new(index.dimension))),
        #[cfg(feature = "api")]
        "api" => {
            let api = ApiConfig::from_env(&index.model)
                .context("Set OPENAI_API_KEY or OPENROUTER_API_KEY to use the api embedder")?
                .with_dimensions(index.dimension);
            Ok(Arc::new(ApiEmbedder::new(api)?))
        }
        other => bail!("Unknown embedder '{}' in [index].embedder", other),
    }
}

/// Print one ranked application in the list style shared by query and course.
pub fn print_application(rank: usize, app: &RankedApplication) {
    let rank = format!("{}.", rank);
    let score = format!("{:.3}", app.score);
    let source = match app.retrieval_source {
        RetrievalSource::DirectSkillMatch => "direct".green(),
        RetrievalSource::SemanticBridge => "bridge".yellow(),
    };

    println!(
        "  {} {} {} {}",
        rank.blue(),
        app.name.white().bold(),
        format!("({})", score).dimmed(),
        source
    );
    if !app.category.is_empty() {
        println!("      {}", app.category.dimmed());
    }
    println!("      Skills: {}", app.matched_skills.join(", "));
    if let Some(note) = &app.bridge_explanation {
        println!("      {}", note.italic());
    }
}

/// Print retrieval warnings to stderr.
pub fn print_warnings(retrieval: &Retrieval) {
    for warning in &retrieval.warnings {
        eprintln!("{} {}", "•".yellow(), warning);
    }
}
