/// Score given to any pair involving a zero-norm vector: the bottom of the range, so
/// degenerate records always rank last instead of faulting.
pub const DEGENERATE_SIMILARITY: f32 = -1.0;

/// Raw cosine similarity in [-1, 1].
///
/// Zero-norm inputs, length mismatches and non-finite results score
/// [`DEGENERATE_SIMILARITY`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; scoring as degenerate"
        );
        return DEGENERATE_SIMILARITY;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return DEGENERATE_SIMILARITY;
    }

    let score = dot / (norm_a * norm_b);
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        DEGENERATE_SIMILARITY
    }
}
