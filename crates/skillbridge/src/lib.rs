//! # Skillbridge
//!
//! Recommends immersive-learning applications from a free-text description of
//! what someone wants to learn.
//!
//! Every recommendation is mediated by skills: courses teach skills,
//! applications develop skills, and a query reaches applications only through
//! the skills it resolves to.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use skillbridge::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::from_json_str(r#"{
//!         "skills": [{"name": "Python", "category": "technical"}],
//!         "applications": [{"app_id": "codevr", "name": "CodeVR", "category": "Education"}],
//!         "develops": [{"app_id": "codevr", "skill": "Python", "weight": 0.9}]
//!     }"#)?;
//!
//!     let (graph, _report) = InMemoryGraph::from_catalog(&catalog);
//!     let index = SkillVectorIndex::new(
//!         Arc::new(InMemoryStore::new(256)),
//!         Arc::new(HashingEmbedder::new(256)),
//!     );
//!     index.index_skills(&catalog.skills).await?;
//!
//!     let retriever =
//!         HybridRetriever::new(Arc::new(index), Arc::new(graph), RetrieverConfig::default()).await?;
//!     for app in retriever.retrieve("learn python", 5).await?.applications {
//!         println!("{} ({:.2}, {})", app.name, app.score, app.retrieval_source);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`skillbridge_core`] - Data model, catalog document, core errors
//! - [`skillbridge_embeddings`] - Text embedders and similarity helpers
//! - [`skillbridge_vectors`] - Vector store and the skill vector index
//! - [`skillbridge_graph`] - Course / skill / application graph
//! - [`skillbridge_rag`] - Hybrid retriever, active-skill cache, explainer boundary
//!
//! ## Retrieval
//!
//! | Pass | Runs when | Score |
//! |------|-----------|-------|
//! | Direct skill match | always | sum of develops weights |
//! | Semantic bridge | direct pass found < 3 applications | graph score × bridge similarity |
//!
//! Bridged results carry a `bridge_explanation` such as `Related to 'Programming'`
//! and never replace a direct match.

// Re-export all subcrates
pub use skillbridge_core as core;
pub use skillbridge_embeddings as embeddings;
pub use skillbridge_graph as graph;
pub use skillbridge_rag as rag;
pub use skillbridge_vectors as vectors;

/// Prelude module for convenient imports.
///
/// ```rust
/// use skillbridge::prelude::*;
/// ```
pub mod prelude {
    // Data model
    pub use skillbridge_core::prelude::*;

    // Embeddings
    pub use skillbridge_embeddings::{
        cosine_similarity, unit_similarity, Embedder, EmbeddingError, HashingEmbedder,
    };
    #[cfg(feature = "api")]
    pub use skillbridge_embeddings::{ApiConfig, ApiEmbedder};

    // Vectors
    pub use skillbridge_vectors::{
        InMemoryStore, SkillIndex, SkillMatch, SkillVectorIndex, VectorError, VectorStore,
    };

    // Graph
    pub use skillbridge_graph::{
        EntityGraph, GraphCounts, GraphError, InMemoryGraph, LoadReport,
    };
    #[cfg(feature = "sqlite")]
    pub use skillbridge_graph::SqliteGraph;

    // Retrieval
    pub use skillbridge_rag::prelude::*;
}
