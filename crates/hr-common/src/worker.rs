use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("worker pool closed")]
    Closed,
    #[error("worker task failed: {0}")]
    Crashed(String),
}

/// Runs blocking collaborator calls on tokio's blocking pool, at most `workers` at a time.
///
/// The timeout covers queueing and execution. A timed-out task keeps its permit until the
/// underlying call returns, so slow backends cannot push concurrency past the bound.
#[derive(Clone)]
pub struct BoundedExecutor {
    permits: Arc<Semaphore>,
    workers: usize,
    timeout: Duration,
}

impl BoundedExecutor {
    pub fn new(workers: usize, timeout: Duration) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
            timeout,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run<T, F>(&self, job: F) -> Result<T, ExecError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.run_with_timeout(self.timeout, job).await
    }

    pub async fn run_with_timeout<T, F>(&self, timeout: Duration, job: F) -> Result<T, ExecError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let work = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|_| ExecError::Closed)?;
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                job()
            })
            .await
            .map_err(|err| ExecError::Crashed(err.to_string()))
        };

        match tokio::time::timeout(timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(ExecError::Timeout(timeout)),
        }
    }
}
