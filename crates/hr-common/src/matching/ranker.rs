use std::cmp::Ordering;

use serde::Serialize;

use crate::RetrievalError;
use crate::embedding::{Embedder, cosine_similarity};
use crate::query::Constraint;
use crate::store::EmployeeRecord;

/// One scored record. Borrows from the store snapshot; the ranker never copies or mutates
/// employee data.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate<'a> {
    pub record: &'a EmployeeRecord,
    pub similarity_score: f32,
    /// Filled in by the shortlist step.
    pub matched_constraints: Vec<Constraint>,
}

/// Descending score, ascending id on ties.
pub fn compare_candidates(a: &RankedCandidate<'_>, b: &RankedCandidate<'_>) -> Ordering {
    b.similarity_score
        .total_cmp(&a.similarity_score)
        .then_with(|| a.record.id.cmp(&b.record.id))
}

/// Score every record against an already computed query vector. Degenerate vectors score
/// -1 and therefore sink to the bottom.
pub fn rank_by_vector<'a>(query: &[f32], records: &'a [EmployeeRecord]) -> Vec<RankedCandidate<'a>> {
    let mut ranked: Vec<_> = records
        .iter()
        .map(|record| RankedCandidate {
            record,
            similarity_score: cosine_similarity(query, record.embedding()),
            matched_constraints: Vec::new(),
        })
        .collect();
    ranked.sort_by(compare_candidates);
    ranked
}

/// Embed `semantic_text` once and rank the full population. Never filters.
pub fn rank<'a>(
    embedder: &dyn Embedder,
    semantic_text: &str,
    records: &'a [EmployeeRecord],
) -> Result<Vec<RankedCandidate<'a>>, RetrievalError> {
    let query = embedder.embed(semantic_text)?;
    check_query_dimension(&query, embedder.dimension())?;
    Ok(rank_by_vector(&query, records))
}

/// A query vector of the wrong length can never be compared against the store.
pub fn check_query_dimension(query: &[f32], expected: usize) -> Result<(), RetrievalError> {
    if query.len() == expected {
        Ok(())
    } else {
        Err(RetrievalError::EmbeddingUnavailable(format!(
            "query vector has dimension {}, store expects {expected}",
            query.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::employee;
    use crate::store::{EmbedderInfo, RecordStore, ValidatedEmployees};

    fn info(dimension: usize) -> EmbedderInfo {
        EmbedderInfo {
            name: "fixed".into(),
            version: "test".into(),
            dimension,
        }
    }

    fn store(vectors: Vec<Vec<f32>>) -> RecordStore {
        let employees = (1..=vectors.len() as i64)
            .map(|id| employee(id, &format!("E{id}"), &[], 1.0))
            .collect();
        let employees = ValidatedEmployees::new(employees).unwrap();
        RecordStore::from_embeddings(employees, vectors, info(2)).unwrap()
    }

    fn ids(ranked: &[RankedCandidate<'_>]) -> Vec<i64> {
        ranked.iter().map(|c| c.record.id).collect()
    }

    #[test]
    fn orders_by_descending_similarity() {
        let store = store(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]]);
        let ranked = rank_by_vector(&[1.0, 0.0], store.records());
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
        assert!((ranked[0].similarity_score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let store = store(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]]);
        let ranked = rank_by_vector(&[1.0, 0.0], store.records());
        assert_eq!(ids(&ranked), vec![1, 2, 3]);
    }

    #[test]
    fn zero_vectors_rank_last() {
        let store = store(vec![vec![0.0, 0.0], vec![-1.0, 0.0], vec![0.5, 0.5]]);
        let ranked = rank_by_vector(&[1.0, 0.0], store.records());
        assert_eq!(ids(&ranked), vec![3, 1, 2]);
        assert_eq!(ranked[1].similarity_score, -1.0);
    }

    #[test]
    fn ranks_the_whole_population() {
        let store = store(vec![vec![1.0, 0.0]; 4]);
        assert_eq!(rank_by_vector(&[0.0, 1.0], store.records()).len(), 4);
        assert!(rank_by_vector(&[1.0, 0.0], &[]).is_empty());
    }

    #[test]
    fn wrong_query_dimension_is_unavailable() {
        let err = check_query_dimension(&[1.0], 2).unwrap_err();
        assert!(matches!(err, RetrievalError::EmbeddingUnavailable(_)));
    }
}
