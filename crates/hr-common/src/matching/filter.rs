use super::ranker::RankedCandidate;
use crate::query::Constraint;

/// Shortlist size when the caller gives none or a non-positive value.
pub const DEFAULT_TOP_K: usize = 5;

/// Requested `top_k`, with missing and non-positive values replaced by [`DEFAULT_TOP_K`].
pub fn normalize_top_k(requested: Option<i64>) -> usize {
    match requested {
        Some(k) if k > 0 => usize::try_from(k).unwrap_or(usize::MAX),
        _ => DEFAULT_TOP_K,
    }
}

/// Keep candidates that satisfy every constraint, in their ranked order, then cut to
/// `top_k`. An empty result is a normal outcome.
pub fn shortlist<'a>(
    ranked: Vec<RankedCandidate<'a>>,
    constraints: &[Constraint],
    top_k: usize,
) -> Vec<RankedCandidate<'a>> {
    let top_k = if top_k == 0 { DEFAULT_TOP_K } else { top_k };
    ranked
        .into_iter()
        .filter(|candidate| {
            constraints
                .iter()
                .all(|constraint| constraint.matches(candidate.record))
        })
        .take(top_k)
        .map(|mut candidate| {
            candidate.matched_constraints = constraints.to_vec();
            candidate
        })
        .collect()
}
