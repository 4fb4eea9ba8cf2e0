//! Cross-source arbitration engine
//!
//! Treats the retained items as nodes of a pairwise similarity graph and
//! scores each one by how much the rest of the corpus mirrors or
//! contradicts it. High intensity means the narrative splits into camps or
//! is being copied verbatim across outlets.

#[cfg(test)]
mod tests;

use crate::analysis::cosine_similarity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Similarity above which two differently-sourced items count as copies
pub const DEFAULT_COPY_THRESHOLD: f32 = 0.92;

/// Copy share vs similarity spread weighting inside intensity. Spread
/// carries most of the range: deduplication upstream already removes the
/// pairs the copy term would count, so camps splitting (one close
/// neighbor, one distant) must be able to push intensity past the
/// classifier thresholds on its own.
const COPY_WEIGHT: f64 = 0.6;
const SPREAD_WEIGHT: f64 = 0.8;

/// Numerical floor inside the entropy log
const ENTROPY_EPSILON: f64 = 1e-9;

/// Winner entropy above this reads as "no clear narrative"
pub const INCONCLUSIVE_ENTROPY: f64 = 1.8;

/// Per-item arbitration output. Position `i` corresponds to bundle
/// position `i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Narrative-conflict magnitude in [0, 1]
    pub intensity: f64,
    /// Max similarity this item shows toward each other source, in [0, 1]
    pub source_scores: BTreeMap<String, f64>,
    pub explanation: String,
}

impl Verdict {
    /// Sum of similarities to every other source; high centrality =
    /// mainstream narrative
    pub fn centrality(&self) -> f64 {
        self.source_scores.values().sum()
    }
}

pub struct ArbitrationEngine {
    copy_threshold: f32,
}

impl Default for ArbitrationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_COPY_THRESHOLD)
    }
}

impl ArbitrationEngine {
    pub fn new(copy_threshold: f32) -> Self {
        Self { copy_threshold }
    }

    /// One verdict per item. `vectors` and `sources` run in parallel; the
    /// items are compared pairwise within the bundle, self-similarity
    /// excluded.
    pub fn analyze(&self, vectors: &[Vec<f32>], sources: &[String]) -> Vec<Verdict> {
        let n = vectors.len().min(sources.len());
        let mut verdicts = Vec::with_capacity(n);

        for i in 0..n {
            let mut source_scores: BTreeMap<String, f64> = BTreeMap::new();
            let mut similarities: Vec<f64> = Vec::with_capacity(n.saturating_sub(1));
            let mut copiers: Vec<String> = Vec::new();

            for j in 0..n {
                if i == j {
                    continue;
                }
                let similarity =
                    (cosine_similarity(&vectors[i], &vectors[j]) as f64).clamp(0.0, 1.0);
                similarities.push(similarity);

                let entry = source_scores.entry(sources[j].clone()).or_insert(0.0);
                if similarity >= *entry {
                    *entry = similarity;
                }

                if similarity > self.copy_threshold as f64
                    && sources[j] != sources[i]
                    && !copiers.contains(&sources[j])
                {
                    copiers.push(sources[j].clone());
                }
            }

            let intensity = Self::intensity(&similarities, copiers.len(), n);
            let explanation = Self::explain(&sources[i], &copiers, &similarities);

            verdicts.push(Verdict {
                intensity,
                source_scores,
                explanation,
            });
        }

        verdicts
    }

    /// Grows with the cross-source copy count and with how sharply the
    /// similarities spread between the closest and furthest neighbor.
    fn intensity(similarities: &[f64], copier_count: usize, n: usize) -> f64 {
        if similarities.is_empty() {
            return 0.0;
        }

        let max = similarities.iter().cloned().fold(f64::MIN, f64::max);
        let min = similarities.iter().cloned().fold(f64::MAX, f64::min);
        let spread = max - min;

        let copy_share = copier_count as f64 / (n - 1) as f64;

        (COPY_WEIGHT * copy_share + SPREAD_WEIGHT * spread).clamp(0.0, 1.0)
    }

    fn explain(source: &str, copiers: &[String], similarities: &[f64]) -> String {
        if copiers.is_empty() {
            let max = similarities.iter().cloned().fold(0.0f64, f64::max);
            format!(
                "No source crosses the copy threshold for {}; closest neighbor at {:.2}",
                source, max
            )
        } else {
            format!(
                "{} is mirrored above the copy threshold by {}",
                source,
                copiers.join(", ")
            )
        }
    }
}

/// Index of the winning item: highest centrality weighted by credibility,
/// first occurrence on ties.
pub fn select_winner(verdicts: &[Verdict], credibility: &[f64]) -> usize {
    let mut winner = 0;
    let mut best = f64::MIN;

    for (i, verdict) in verdicts.iter().enumerate() {
        let weight = 1.0 + credibility.get(i).copied().unwrap_or(0.0);
        let score = verdict.centrality() * weight;
        if score > best {
            best = score;
            winner = i;
        }
    }

    winner
}

/// Shannon entropy of the winner's source scores, normalized by their sum.
/// All-equal scores give ln(k); a single dominant source gives ~0.
pub fn global_entropy(source_scores: &BTreeMap<String, f64>) -> f64 {
    let total: f64 = source_scores.values().sum();
    if total <= 0.0 {
        return 0.0;
    }

    -source_scores
        .values()
        .map(|score| {
            let p = score / total;
            p * (p + ENTROPY_EPSILON).ln()
        })
        .sum::<f64>()
}
