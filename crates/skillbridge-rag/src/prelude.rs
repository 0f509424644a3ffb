//! Skillbridge RAG prelude.
//!
//! ```rust
//! use skillbridge_rag::prelude::*;
//! ```

pub use crate::cache::ActiveSkillCache;
pub use crate::config::{BridgeFailurePolicy, RetrieverConfig};
pub use crate::error::{RetrievalError, RetrievalResult};
pub use crate::explain::{
    candidate_digest, explain_or_fallback, ExplainError, Explainer, FallbackExplainer,
    Recommendation, FALLBACK_REASONING,
};
pub use crate::retriever::{detect_course_code, HybridRetriever, Retrieval, RetrievalWarning};
pub use crate::scoring::{merge_candidates, penalize_bridged, sort_descending_by_score};

pub use skillbridge_graph::{EntityGraph, GraphCounts, GraphError};
pub use skillbridge_vectors::{SkillIndex, SkillMatch, VectorError};
