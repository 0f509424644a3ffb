//! Configuration management for the skillbridge CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skillbridge::rag::RetrieverConfig;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "skillbridge.toml";

/// Skillbridge project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrieverConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory relative data paths resolve against.
    #[serde(skip)]
    root: Option<PathBuf>,

    /// File this config was read from.
    #[serde(skip)]
    source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// `hashing` (offline) or `api` (OpenAI-compatible endpoint).
    #[serde(default = "default_embedder")]
    pub embedder: String,
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    /// Persist the graph in this SQLite file instead of memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqlite: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
}

// Default value functions
fn default_dimension() -> usize { 256 }
fn default_embedder() -> String { "hashing".to_string() }
fn default_model() -> String { "text-embedding-3-small".to_string() }
fn default_catalog() -> PathBuf { PathBuf::from("catalog.json") }
fn default_filter() -> String { "info".to_string() }

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            embedder: default_embedder(),
            model: default_model(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            sqlite: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Config {
    /// Load skillbridge.toml from the current or a parent directory, then the
    /// user config directory. Defaults when neither exists.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let found = find_config_file(&cwd).or_else(user_config_file);
        match found {
            Some(path) => Self::load_from(&path),
            None => Ok(Config {
                root: Some(cwd),
                ..Config::default()
            }),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.retrieval.validate().map_err(|e| {
            anyhow::anyhow!("Invalid [retrieval] section in {}: {}", path.display(), e)
        })?;
        config.root = path.parent().map(Path::to_path_buf);
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// The file this config came from, `None` for built-in defaults.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Resolve a data path against the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.resolve(&self.data.catalog)
    }

    pub fn sqlite_path(&self) -> Option<PathBuf> {
        self.data.sqlite.as_deref().map(|p| self.resolve(p))
    }
}

/// Find skillbridge.toml in `start` or its parents.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

fn user_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("skillbridge").join(CONFIG_FILE);
    path.exists().then_some(path)
}
