//! Vector similarity utilities.
//!
//! Pure-Rust implementations of:
//! - Cosine similarity
//! - Top-k ranking of stored records against a query vector

use openclaw_core::memory::{MemoryPayload, MemoryRecord, VectorMatch};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank records by cosine similarity to a query vector.
///
/// Returns at most `k` matches sorted by descending similarity; equal
/// scores are ordered by record id so results are reproducible.
pub fn rank_records(records: &[MemoryRecord], query: &[f32], k: usize) -> Vec<VectorMatch> {
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<VectorMatch> = records
        .iter()
        .map(|r| VectorMatch {
            id: r.id.clone(),
            score: cosine_similarity(&r.embedding, query),
            payload: MemoryPayload {
                text: r.text.clone(),
                metadata: r.metadata.clone(),
            },
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    scored.truncate(k);
    scored
}
