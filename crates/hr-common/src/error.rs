use std::time::Duration;

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;

/// Request-scoped failures of the retrieval pipeline.
///
/// An empty shortlist is not represented here: it is a valid outcome carried by
/// [`crate::context::GenerationPayload::no_candidates`].
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),
    #[error("embedding timed out after {0:?}")]
    EmbeddingTimeout(Duration),
    #[error("generation unavailable: {0}")]
    GenerationUnavailable(String),
    #[error("generation timed out after {0:?}")]
    GenerationTimeout(Duration),
    #[error("record store has not been loaded")]
    RecordStoreUninitialized,
}

impl RetrievalError {
    /// Stable machine-readable code, used in logs and API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RetrievalError::InvalidQuery(_) => "invalid_query",
            RetrievalError::EmbeddingUnavailable(_) => "embedding_unavailable",
            RetrievalError::EmbeddingTimeout(_) => "embedding_timeout",
            RetrievalError::GenerationUnavailable(_) => "generation_unavailable",
            RetrievalError::GenerationTimeout(_) => "generation_timeout",
            RetrievalError::RecordStoreUninitialized => "record_store_uninitialized",
        }
    }
}

impl From<EmbeddingError> for RetrievalError {
    fn from(value: EmbeddingError) -> Self {
        match value {
            EmbeddingError::Timeout(after) => RetrievalError::EmbeddingTimeout(after),
            other => RetrievalError::EmbeddingUnavailable(other.to_string()),
        }
    }
}

impl From<GenerationError> for RetrievalError {
    fn from(value: GenerationError) -> Self {
        match value {
            GenerationError::Timeout(after) => RetrievalError::GenerationTimeout(after),
            other => RetrievalError::GenerationUnavailable(other.to_string()),
        }
    }
}
