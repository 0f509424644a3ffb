//! Retrieval errors.
//!
//! Only failures of the collaborators surface here. A query that matches
//! nothing returns an empty result.

use skillbridge_core::error::ConfigError;
use skillbridge_graph::GraphError;
use skillbridge_vectors::VectorError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Vector index error: {0}")]
    VectorIndex(#[from] VectorError),

    #[error("Graph store error: {0}")]
    Graph(#[from] GraphError),

    #[error("Invalid retriever configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Retrieval did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}

impl RetrievalError {
    /// Whether a collaborator could not be reached or answered with bad data.
    pub fn is_transport(&self) -> bool {
        matches!(self, RetrievalError::VectorIndex(_) | RetrievalError::Graph(_))
    }
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
