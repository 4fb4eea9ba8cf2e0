//! Near-duplicate removal
//!
//! Greedy and order-preserving: an item survives iff its maximum cosine
//! similarity against everything already kept stays strictly below the
//! threshold. O(n²), fine for the ~100 items a request can carry.

use super::cosine_similarity;

/// Items closer than this are considered the same story
pub const DEDUP_THRESHOLD: f32 = 0.92;

/// Filter `items` by vector similarity, returning the survivors and their
/// vectors in input order.
pub fn dedupe_by_vectors<T>(
    items: Vec<T>,
    vectors: Vec<Vec<f32>>,
    threshold: f32,
) -> (Vec<T>, Vec<Vec<f32>>) {
    let mut kept_items: Vec<T> = Vec::new();
    let mut kept_vectors: Vec<Vec<f32>> = Vec::new();

    for (item, vector) in items.into_iter().zip(vectors.into_iter()) {
        let max_sim = kept_vectors
            .iter()
            .map(|kept| cosine_similarity(&vector, kept))
            .fold(f32::NEG_INFINITY, f32::max);

        if kept_vectors.is_empty() || max_sim < threshold {
            kept_items.push(item);
            kept_vectors.push(vector);
        }
    }

    (kept_items, kept_vectors)
}
