pub mod document;
pub mod loader;
pub mod stats;

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::embedding::{Embedder, EmbeddingError};
use crate::query::QueryVocabulary;
use crate::skill_normalizer::normalize_skill_set;
use crate::{Availability, Employee, RetrievalError, run_id};

pub use document::employee_document;
pub use loader::{EmployeeSource, InMemorySource, JsonFileSource, LoadError};
pub use stats::DirectoryStats;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate employee id {0}")]
    DuplicateId(i64),
    #[error("invalid employee {id}: {reason}")]
    InvalidRecord { id: i64, reason: String },
    #[error("embedder returned {actual} vectors for {expected} employees")]
    EmbeddingCountMismatch { expected: usize, actual: usize },
    #[error("employee {id} embedding has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        id: i64,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("store build task failed: {0}")]
    Worker(String),
}

/// An employee plus everything precomputed for retrieval. Only [`RecordStore`] builds
/// these, which is what guarantees every record carries an embedding of the store's
/// dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRecord {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub department: String,
    /// Normalized, deduplicated skill tokens.
    pub skills: BTreeSet<String>,
    /// Skill labels as written in the source, for display.
    pub skill_labels: Vec<String>,
    pub experience_years: f64,
    pub availability: Availability,
    pub projects: Vec<String>,
    #[serde(skip)]
    embedding: Vec<f32>,
}

impl EmployeeRecord {
    fn new(employee: Employee, embedding: Vec<f32>) -> Self {
        Self {
            id: employee.id,
            skills: normalize_skill_set(&employee.skills),
            skill_labels: employee.skills,
            name: employee.name,
            role: employee.role,
            department: employee.department,
            experience_years: employee.experience_years,
            availability: employee.availability,
            projects: employee.projects,
            embedding,
        }
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn has_skill(&self, canonical: &str) -> bool {
        self.skills.contains(canonical)
    }
}

/// Which encoder produced a snapshot's vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedderInfo {
    pub name: String,
    pub version: String,
    pub dimension: usize,
}

impl EmbedderInfo {
    pub fn of(embedder: &dyn Embedder) -> Self {
        Self {
            name: embedder.name().to_string(),
            version: embedder.version().to_string(),
            dimension: embedder.dimension(),
        }
    }
}

fn validate(employees: &[Employee]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(employees.len());
    for employee in employees {
        if !seen.insert(employee.id) {
            return Err(StoreError::DuplicateId(employee.id));
        }
        if employee.name.trim().is_empty() {
            return Err(StoreError::InvalidRecord {
                id: employee.id,
                reason: "name is empty".into(),
            });
        }
        if !employee.experience_years.is_finite() || employee.experience_years < 0.0 {
            return Err(StoreError::InvalidRecord {
                id: employee.id,
                reason: format!(
                    "experience_years must be a non-negative number, got {}",
                    employee.experience_years
                ),
            });
        }
    }
    Ok(())
}

/// Employees that passed load validation: unique ids, non-empty names and a finite,
/// non-negative experience value. The only input [`RecordStore`] is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEmployees(Vec<Employee>);

impl ValidatedEmployees {
    pub fn new(employees: Vec<Employee>) -> Result<Self, StoreError> {
        validate(&employees)?;
        Ok(Self(employees))
    }

    /// Canonical texts to embed, in input order.
    pub fn documents(&self) -> Vec<String> {
        self.0.iter().map(employee_document).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Immutable snapshot of the employee directory. Records are ordered by ascending id.
#[derive(Debug)]
pub struct RecordStore {
    snapshot_id: String,
    loaded_at: DateTime<Utc>,
    embedder: EmbedderInfo,
    records: Vec<EmployeeRecord>,
    vocabulary: QueryVocabulary,
}

impl RecordStore {
    /// Validate, embed and index `employees` in one blocking call.
    pub fn build(employees: Vec<Employee>, embedder: &dyn Embedder) -> Result<Self, StoreError> {
        let employees = ValidatedEmployees::new(employees)?;
        let embeddings = embedder.embed_batch(&employees.documents())?;
        Self::from_embeddings(employees, embeddings, EmbedderInfo::of(embedder))
    }

    /// Assemble a snapshot from validated employees and their precomputed vectors
    /// (same order).
    pub fn from_embeddings(
        employees: ValidatedEmployees,
        embeddings: Vec<Vec<f32>>,
        embedder: EmbedderInfo,
    ) -> Result<Self, StoreError> {
        let ValidatedEmployees(employees) = employees;
        if embeddings.len() != employees.len() {
            return Err(StoreError::EmbeddingCountMismatch {
                expected: employees.len(),
                actual: embeddings.len(),
            });
        }

        let dimension = embedder.dimension;
        let mut records = Vec::with_capacity(employees.len());
        for (employee, embedding) in employees.into_iter().zip(embeddings) {
            if embedding.len() != dimension || dimension == 0 {
                return Err(StoreError::DimensionMismatch {
                    id: employee.id,
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            records.push(EmployeeRecord::new(employee, embedding));
        }
        records.sort_by_key(|record| record.id);

        let vocabulary = QueryVocabulary::from_records(&records);
        let store = Self {
            snapshot_id: run_id::generate(),
            loaded_at: Utc::now(),
            embedder,
            records,
            vocabulary,
        };

        info!(
            snapshot_id = %store.snapshot_id,
            employees = store.records.len(),
            embedder = %store.embedder.name,
            dimension = store.embedder.dimension,
            skills = store.vocabulary.skill_count(),
            departments = store.vocabulary.department_count(),
            "record store built"
        );
        Ok(store)
    }

    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn embedder(&self) -> &EmbedderInfo {
        &self.embedder
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn vocabulary(&self) -> &QueryVocabulary {
        &self.vocabulary
    }

    pub fn get(&self, id: i64) -> Option<&EmployeeRecord> {
        self.records
            .binary_search_by_key(&id, |record| record.id)
            .ok()
            .map(|idx| &self.records[idx])
    }

    pub fn stats(&self) -> DirectoryStats {
        stats::compute(&self.records)
    }
}

/// Shared pointer to the current [`RecordStore`] snapshot.
///
/// Readers clone the `Arc` and keep working on that snapshot even if a reload swaps in a
/// new one mid-request. The lock is held only for the pointer copy/swap.
#[derive(Debug, Default)]
pub struct StoreHandle {
    current: RwLock<Option<Arc<RecordStore>>>,
}

impl StoreHandle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_store(store: RecordStore) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(store))),
        }
    }

    pub fn snapshot(&self) -> Result<Arc<RecordStore>, RetrievalError> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone().ok_or(RetrievalError::RecordStoreUninitialized)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_ok()
    }

    /// Publish `store`, returning the snapshot it replaced.
    pub fn install(&self, store: RecordStore) -> Option<Arc<RecordStore>> {
        let next = Arc::new(store);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.replace(next)
    }
}
