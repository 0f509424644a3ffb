//! Embeddings from an OpenAI-compatible HTTP endpoint (`api` feature).
//!
//! Any server that accepts `POST <base>/embeddings` with the OpenAI request
//! shape works: OpenAI, OpenRouter, or a local inference server.

use crate::{Embedder, EmbeddingError, EmbeddingResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_DIMENSION: usize = 1536;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Ask the model to truncate its output to this many dimensions.
    pub dimensions: Option<usize>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            dimensions: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// OpenAI with `text-embedding-3-small`.
    pub fn openai(api_key: &str) -> Self {
        Self::new(DEFAULT_BASE_URL, api_key, "text-embedding-3-small")
    }

    /// Key from `OPENAI_API_KEY` (or `OPENROUTER_API_KEY`), endpoint from
    /// `OPENAI_BASE_URL` when set. `None` without a key.
    pub fn from_env(model: &str) -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
            .ok()?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Some(Self::new(&base_url, &api_key, model))
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct Response {
    data: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an embeddings endpoint.
///
/// [`Embedder`] is synchronous, so each call drives the async request to
/// completion. Inside a Tokio runtime it must run off the async workers
/// (`spawn_blocking`, as the skill index does). Outside one, a
/// single-threaded runtime is started for the call.
///
/// ```rust,ignore
/// use skillbridge_embeddings::{ApiConfig, ApiEmbedder, Embedder};
///
/// let embedder = ApiEmbedder::new(ApiConfig::openai("sk-...").with_dimensions(256))?;
/// let vector = embedder.embed("data visualization")?;
/// ```
pub struct ApiEmbedder {
    config: ApiConfig,
    client: reqwest::Client,
}

impl ApiEmbedder {
    pub fn new(config: ApiConfig) -> EmbeddingResult<Self> {
        // Calls may run on short-lived runtimes; pooled connections would not
        // survive them.
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| EmbeddingError::Backend(e.to_string()))?;
        Ok(Self { config, client })
    }

    async fn request(&self, texts: &[&str]) -> EmbeddingResult<Vec<Item>> {
        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&Request {
                model: &self.config.model,
                input: texts,
                dimensions: self.config.dimensions,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Backend(format!("HTTP {}: {}", status, body)));
        }

        Ok(response
            .json::<Response>()
            .await
            .map_err(|e| EmbeddingError::Backend(e.to_string()))?
            .data)
    }
}

fn block_on<F: Future>(fut: F) -> EmbeddingResult<F::Output> {
    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => {
                Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
            }
            _ => Ok(handle.block_on(fut)),
        },
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| EmbeddingError::Backend(e.to_string()))?;
            Ok(runtime.block_on(fut))
        }
    }
}

impl Embedder for ApiEmbedder {
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| EmbeddingError::Backend("endpoint returned no vector".into()))
    }

    fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = block_on(self.request(texts))??;
        if items.len() != texts.len() {
            return Err(EmbeddingError::Backend(format!(
                "sent {} texts, received {} vectors",
                texts.len(),
                items.len()
            )));
        }
        items.sort_by_key(|item| item.index);
        Ok(items.into_iter().map(|item| item.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimensions.unwrap_or(DEFAULT_DIMENSION)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let config = ApiConfig::new("http://localhost:8080/v1/", "k", "nomic-embed-text");
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/embeddings");

        let openai = ApiConfig::openai("k").with_dimensions(256);
        assert_eq!(openai.endpoint(), "https://api.openai.com/v1/embeddings");
        assert_eq!(openai.dimensions, Some(256));
    }

    #[test]
    fn request_omits_absent_dimensions() {
        let input = ["Python"];
        let json = serde_json::to_value(Request {
            model: "m",
            input: &input,
            dimensions: None,
        })
        .unwrap();
        assert!(json.get("dimensions").is_none());
        assert_eq!(json["input"][0], "Python");
    }

    fn unreachable() -> ApiConfig {
        ApiConfig::new("http://127.0.0.1:9/v1", "k", "m")
            .with_dimensions(8)
            .with_timeout(Duration::from_secs(2))
    }

    #[tokio::test]
    async fn embedder_builds_and_drops_inside_runtime() {
        let embedder = ApiEmbedder::new(unreachable()).unwrap();
        assert_eq!(embedder.dimension(), 8);
        assert_eq!(embedder.model_name(), "m");
        drop(embedder);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_request_from_blocking_pool_is_a_backend_error() {
        let embedder = ApiEmbedder::new(unreachable()).unwrap();
        let result = tokio::task::spawn_blocking(move || embedder.embed("Python"))
            .await
            .unwrap();
        assert!(matches!(result, Err(EmbeddingError::Backend(_))));
    }

    #[test]
    fn failed_request_without_runtime_is_a_backend_error() {
        let embedder = ApiEmbedder::new(unreachable()).unwrap();
        assert!(matches!(
            embedder.embed_batch(&["Python", "R"]),
            Err(EmbeddingError::Backend(_))
        ));
    }
}
