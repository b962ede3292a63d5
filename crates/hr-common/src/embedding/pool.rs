use std::sync::Arc;
use std::time::Duration;

use super::{Embedder, EmbeddingError};
use crate::worker::{BoundedExecutor, ExecError};

fn exec_error(err: ExecError) -> EmbeddingError {
    match err {
        ExecError::Timeout(after) => EmbeddingError::Timeout(after),
        other => EmbeddingError::Request(other.to_string()),
    }
}

/// Gate in front of an [`Embedder`]: bounded concurrency plus a per-call timeout.
#[derive(Clone)]
pub struct EmbeddingPool {
    embedder: Arc<dyn Embedder>,
    executor: BoundedExecutor,
}

impl EmbeddingPool {
    pub fn new(embedder: Arc<dyn Embedder>, workers: usize, timeout: Duration) -> Self {
        Self {
            embedder,
            executor: BoundedExecutor::new(workers, timeout),
        }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn timeout(&self) -> Duration {
        self.executor.timeout()
    }

    pub async fn embed(&self, text: String) -> Result<Vec<f32>, EmbeddingError> {
        let embedder = Arc::clone(&self.embedder);
        self.executor
            .run(move || embedder.embed(&text))
            .await
            .map_err(exec_error)?
    }

    pub async fn embed_batch(
        &self,
        texts: Vec<String>,
        timeout: Duration,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let embedder = Arc::clone(&self.embedder);
        self.executor
            .run_with_timeout(timeout, move || embedder.embed_batch(&texts))
            .await
            .map_err(exec_error)?
    }
}
