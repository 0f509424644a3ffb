//! Skillbridge CLI - Recommend immersive-learning applications by skill.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "skillbridge")]
#[command(author, version, about = "Skillbridge - Skill-mediated app recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Skillbridge project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Recommend applications for a learning goal
    Query {
        /// What you want to learn (may mention a course code like 15-112)
        query: String,

        /// Maximum applications to return (default: [retrieval].default_top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Show reasoning and the explainer input
        #[arg(short, long)]
        explain: bool,
    },

    /// Recommend applications for the skills a course teaches
    Course {
        /// Course code, e.g. 15-112
        code: String,

        /// Maximum applications to return (default: [retrieval].default_top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Show the skills closest to a text
    Skills {
        /// Free text to match against the skill vocabulary
        text: String,

        /// Number of skills
        #[arg(short = 'k', long, default_value = "10")]
        top_k: usize,
    },

    /// List the skills at least one application develops
    Active,

    /// Show catalog and graph statistics
    Stats,
}

fn init_tracing(verbose: bool, config_filter: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SKILLBRIDGE_LOG")
            .or_else(|_| EnvFilter::try_new(config_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // The logging filter lives in the config, so loading happens before the
    // subscriber exists; report the result once it does.
    let config = Config::load()?;
    init_tracing(cli.verbose, &config.logging.filter);
    match config.source() {
        Some(path) => debug!(path = %path.display(), "loaded configuration"),
        None => debug!("no skillbridge.toml found, using defaults"),
    }

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Query {
            query,
            top_k,
            json,
            explain,
        } => commands::query::run(&config, &query, top_k, json, explain).await,
        Commands::Course { code, top_k } => commands::course::run(&config, &code, top_k).await,
        Commands::Skills { text, top_k } => commands::skills::run(&config, &text, top_k).await,
        Commands::Active => commands::active::run(&config).await,
        Commands::Stats => commands::stats::run(&config).await,
    }
}
