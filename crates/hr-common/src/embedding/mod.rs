pub mod config;
pub mod hash;
pub mod openai;
pub mod pool;
pub mod similarity;
pub mod tokenizer;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub use config::{EmbedderKind, EmbeddingConfig};
pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;
pub use pool::EmbeddingPool;
pub use similarity::cosine_similarity;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Request(String),
    #[error("embedding request timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("embedding configuration error: {0}")]
    Config(String),
}

/// Text encoder injected into the retrieval core.
///
/// Implementations must be deterministic for identical input and free of side effects
/// visible to the caller. `name()` and `version()` are recorded on every store snapshot so
/// a reload with a different encoder is visible.
pub trait Embedder: Send + Sync {
    /// Backend name ("hash", "openai").
    fn name(&self) -> &'static str;

    /// Encoder generation; bump when token design or model changes.
    fn version(&self) -> &str;

    /// Expected vector length.
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Default implementation loops; remote backends override with one batched call.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Build the configured backend. An OpenAI backend without credentials is a configuration
/// error rather than a silent switch to hashing, because the two produce incomparable
/// vectors.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    let embedder: Arc<dyn Embedder> = match config.kind {
        EmbedderKind::Hash => Arc::new(HashEmbedder::new(config.dimension)),
        EmbedderKind::OpenAi => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                EmbeddingError::Config("OPENAI_API_KEY is required for HR_EMBEDDER=openai".into())
            })?;
            Arc::new(OpenAiEmbedder::new(
                api_key,
                config.base_url.clone(),
                config.model.clone(),
                config.dimension,
                config.timeout,
            )?)
        }
    };

    if embedder.dimension() == 0 {
        warn!(embedder = embedder.name(), "embedder reports zero dimension");
    }
    info!(
        embedder = embedder.name(),
        version = embedder.version(),
        dimension = embedder.dimension(),
        "embedder ready"
    );
    Ok(embedder)
}
