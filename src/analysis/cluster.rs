//! Narrative clustering
//!
//! K-means over the retained vectors, with k derived from the item count.
//! The seed is fixed so a given bundle always produces the same labels.

use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

const KMEANS_SEED: u64 = 42;
const MAX_ITERATIONS: u64 = 100;

/// k = min(4, max(2, n / 5))
pub fn cluster_count(n: usize) -> usize {
    (n / 5).clamp(2, 4)
}

/// One cluster label per vector, in input order. Bundles too small to
/// partition (n < k + 1) all land in cluster 0, and a failed fit degrades
/// the same way instead of failing the request.
pub fn cluster_vectors(vectors: &[Vec<f32>]) -> Vec<usize> {
    let n = vectors.len();
    let k = cluster_count(n);
    if n < k + 1 {
        return vec![0; n];
    }

    let dim = vectors[0].len();
    let mut records = Array2::<f64>::zeros((n, dim));
    for (i, vector) in vectors.iter().enumerate() {
        for (j, value) in vector.iter().enumerate() {
            records[[i, j]] = *value as f64;
        }
    }

    let dataset = DatasetBase::from(records.clone());
    let rng = Xoshiro256Plus::seed_from_u64(KMEANS_SEED);
    match KMeans::params_with_rng(k, rng)
        .max_n_iterations(MAX_ITERATIONS)
        .fit(&dataset)
    {
        Ok(model) => model.predict(&records).to_vec(),
        Err(e) => {
            tracing::warn!("k-means fit failed ({}), using a single cluster", e);
            vec![0; n]
        }
    }
}
