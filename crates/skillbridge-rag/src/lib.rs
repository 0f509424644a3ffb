//! # Skillbridge RAG
//!
//! Query-time retrieval of immersive-learning applications.
//!
//! The [`HybridRetriever`] combines a [`SkillIndex`](skillbridge_vectors::SkillIndex)
//! (query → related skills) with an [`EntityGraph`](skillbridge_graph::EntityGraph)
//! (skills → applications). When the direct path finds too little, a semantic
//! bridge ranks the query against the skills applications actually develop.
//!
//! | Module | Role |
//! |--------|------|
//! | [`retriever`] | Two-pass retrieval, course lookup, deadlines |
//! | [`cache`] | Active-skill cache with single-flight refresh |
//! | [`scoring`] | Bridge penalty, merge, ordering |
//! | [`explain`] | Boundary to the external ranker/explainer |
//! | [`config`] | Retriever tunables |
//!
//! ```rust
//! use std::sync::Arc;
//! use skillbridge_core::prelude::*;
//! use skillbridge_embeddings::HashingEmbedder;
//! use skillbridge_graph::InMemoryGraph;
//! use skillbridge_rag::prelude::*;
//! use skillbridge_vectors::{InMemoryStore, SkillVectorIndex};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut graph = InMemoryGraph::new();
//!     graph.add_skill(Skill::new("Python", SkillCategory::Technical));
//!     graph.add_application(Application {
//!         app_id: "codevr".into(),
//!         name: "CodeVR".into(),
//!         category: "Education".into(),
//!         description: String::new(),
//!         features: vec![],
//!         rating: None,
//!         price: None,
//!     });
//!     graph.add_develops(&Develops { app_id: "codevr".into(), skill: "Python".into(), weight: 0.9 })?;
//!
//!     let index = SkillVectorIndex::new(
//!         Arc::new(InMemoryStore::new(128)),
//!         Arc::new(HashingEmbedder::new(128)),
//!     );
//!     index.index_skills(&[Skill::new("Python", SkillCategory::Technical)]).await?;
//!
//!     let retriever =
//!         HybridRetriever::new(Arc::new(index), Arc::new(graph), RetrieverConfig::default()).await?;
//!     let result = retriever.retrieve("python", 8).await?;
//!     assert_eq!(result.applications[0].name, "CodeVR");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod explain;
pub mod prelude;
pub mod retriever;
pub mod scoring;

pub use cache::ActiveSkillCache;
pub use config::{BridgeFailurePolicy, RetrieverConfig};
pub use error::{RetrievalError, RetrievalResult};
pub use explain::{
    candidate_digest, explain_or_fallback, ExplainError, Explainer, FallbackExplainer,
    Recommendation,
};
pub use retriever::{detect_course_code, HybridRetriever, Retrieval, RetrievalWarning};
