use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::filter::{normalize_top_k, shortlist};
use super::ranker::{check_query_dimension, rank_by_vector};
use crate::RetrievalError;
use crate::config::EngineConfig;
use crate::context::{GenerationPayload, assemble};
use crate::embedding::{Embedder, EmbeddingPool, create_embedder};
use crate::generation::{GenerationGate, Generator, create_generator};
use crate::query::{ParsedQuery, QueryInterpreter};
use crate::store::{
    EmbedderInfo, EmployeeRecord, EmployeeSource, RecordStore, StoreError, StoreHandle,
    ValidatedEmployees,
};

/// Result of the retrieval core for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalOutcome {
    pub snapshot_id: String,
    pub parsed: ParsedQuery,
    pub top_k: usize,
    pub payload: GenerationPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatAnswer {
    pub response: String,
    pub generator: &'static str,
    pub retrieval: RetrievalOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReloadSummary {
    pub snapshot_id: String,
    pub previous_snapshot_id: Option<String>,
    pub employees: usize,
    pub embedder: EmbedderInfo,
    pub elapsed_ms: u64,
}

fn ensure_query(raw_text: &str) -> Result<(), RetrievalError> {
    if raw_text.trim().is_empty() {
        return Err(RetrievalError::InvalidQuery("query text is empty".into()));
    }
    Ok(())
}

/// Rank, filter and assemble once the query vector is known.
fn finish(
    store: &RecordStore,
    parsed: ParsedQuery,
    query_vector: &[f32],
    top_k: usize,
) -> Result<RetrievalOutcome, RetrievalError> {
    check_query_dimension(query_vector, store.dimension())?;
    let ranked = rank_by_vector(query_vector, store.records());
    let shortlist = shortlist(ranked, &parsed.constraints, top_k);
    let payload = assemble(&parsed.raw_text, &shortlist);
    Ok(RetrievalOutcome {
        snapshot_id: store.snapshot_id().to_string(),
        parsed,
        top_k,
        payload,
    })
}

/// Synchronous composition of interpret, rank, shortlist and assemble against one
/// snapshot, calling the embedder inline.
pub fn retrieve_with(
    store: &RecordStore,
    embedder: &dyn Embedder,
    interpreter: &QueryInterpreter,
    raw_text: &str,
    top_k: Option<i64>,
) -> Result<RetrievalOutcome, RetrievalError> {
    ensure_query(raw_text)?;
    let parsed = interpreter.interpret(raw_text, store.vocabulary());
    let query_vector = embedder.embed(&parsed.semantic_text)?;
    finish(store, parsed, &query_vector, normalize_top_k(top_k))
}

/// The retrieval-and-ranking engine plus its collaborators.
///
/// Queries read an immutable snapshot from the [`StoreHandle`]; reloads are serialized by
/// `reload_lock` and publish a new snapshot only after it is fully built.
pub struct RetrievalEngine {
    store: StoreHandle,
    source: Arc<dyn EmployeeSource>,
    embeddings: EmbeddingPool,
    generation: GenerationGate,
    interpreter: QueryInterpreter,
    reload_timeout: Duration,
    reload_lock: Mutex<()>,
}

impl RetrievalEngine {
    pub fn new(
        source: Arc<dyn EmployeeSource>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store: StoreHandle::empty(),
            source,
            embeddings: EmbeddingPool::new(
                embedder,
                config.embedding.workers,
                config.embedding.timeout,
            ),
            generation: GenerationGate::new(
                generator,
                config.generation.workers,
                config.generation.timeout,
            ),
            interpreter: QueryInterpreter::new(config.strip_policy),
            reload_timeout: config.embedding.reload_timeout,
            reload_lock: Mutex::new(()),
        }
    }

    /// Build collaborators from `config`. Fails on configuration errors only; the store
    /// stays empty until [`RetrievalEngine::reload`].
    pub fn from_config(
        config: &EngineConfig,
        source: Arc<dyn EmployeeSource>,
    ) -> Result<Self, RetrievalError> {
        let embedder = create_embedder(&config.embedding)?;
        let generator = create_generator(&config.generation)?;
        Ok(Self::new(source, embedder, generator, config))
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn snapshot(&self) -> Result<Arc<RecordStore>, RetrievalError> {
        self.store.snapshot()
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        self.embeddings.embedder()
    }

    pub fn generator_name(&self) -> &'static str {
        self.generation.generator().name()
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub fn interpret(&self, raw_text: &str) -> Result<ParsedQuery, RetrievalError> {
        let store = self.store.snapshot()?;
        Ok(self.interpreter.interpret(raw_text, store.vocabulary()))
    }

    /// Interpret, embed through the bounded pool, rank, shortlist and assemble.
    pub async fn retrieve(
        &self,
        raw_text: &str,
        top_k: Option<i64>,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        ensure_query(raw_text)?;
        let store = self.store.snapshot()?;
        let top_k = normalize_top_k(top_k);
        let parsed = self.interpreter.interpret(raw_text, store.vocabulary());
        debug!(
            query = raw_text,
            semantic_text = %parsed.semantic_text,
            constraints = ?parsed.constraints,
            "query interpreted"
        );

        let query_vector = self
            .embeddings
            .embed(parsed.semantic_text.clone())
            .await
            .map_err(|err| {
                warn!(error = %err, "query embedding failed");
                RetrievalError::from(err)
            })?;

        let outcome = finish(&store, parsed, &query_vector, top_k)?;
        info!(
            snapshot_id = %outcome.snapshot_id,
            constraints = outcome.parsed.constraints.len(),
            shortlisted = outcome.payload.candidates.len(),
            top_k,
            "query retrieved"
        );
        Ok(outcome)
    }

    /// `process(raw_text, top_k) -> GenerationPayload`.
    pub async fn process(
        &self,
        raw_text: &str,
        top_k: Option<i64>,
    ) -> Result<GenerationPayload, RetrievalError> {
        Ok(self.retrieve(raw_text, top_k).await?.payload)
    }

    /// Retrieval followed by generation.
    pub async fn answer(
        &self,
        raw_text: &str,
        top_k: Option<i64>,
    ) -> Result<ChatAnswer, RetrievalError> {
        let retrieval = self.retrieve(raw_text, top_k).await?;
        let response = self
            .generation
            .generate(retrieval.payload.clone())
            .await
            .map_err(|err| {
                warn!(error = %err, "generation failed");
                RetrievalError::from(err)
            })?;
        Ok(ChatAnswer {
            response,
            generator: self.generator_name(),
            retrieval,
        })
    }

    /// Records in ascending id order.
    pub fn all(&self) -> Result<Vec<EmployeeRecord>, RetrievalError> {
        Ok(self.store.snapshot()?.records().to_vec())
    }

    pub fn get(&self, id: i64) -> Result<Option<EmployeeRecord>, RetrievalError> {
        Ok(self.store.snapshot()?.get(id).cloned())
    }

    /// Load, embed and publish a fresh snapshot. On any failure the current snapshot stays
    /// in place.
    pub async fn reload(&self) -> Result<ReloadSummary, StoreError> {
        let _guard = self.reload_lock.lock().await;
        let started = Instant::now();

        let source = Arc::clone(&self.source);
        let employees = tokio::task::spawn_blocking(move || source.load_all())
            .await
            .map_err(|err| StoreError::Worker(err.to_string()))??;

        let employees = ValidatedEmployees::new(employees)?;
        let embeddings = self
            .embeddings
            .embed_batch(employees.documents(), self.reload_timeout)
            .await?;
        let info = EmbedderInfo::of(self.embeddings.embedder().as_ref());
        let store = RecordStore::from_embeddings(employees, embeddings, info.clone())?;

        let snapshot_id = store.snapshot_id().to_string();
        let employees = store.len();
        let previous = self.store.install(store);
        let summary = ReloadSummary {
            snapshot_id,
            previous_snapshot_id: previous.map(|p| p.snapshot_id().to_string()),
            employees,
            embedder: info,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            source = %self.source.describe(),
            snapshot_id = %summary.snapshot_id,
            previous = ?summary.previous_snapshot_id,
            employees = summary.employees,
            elapsed_ms = summary.elapsed_ms,
            "record store reloaded"
        );
        Ok(summary)
    }
}
