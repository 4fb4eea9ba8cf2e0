//! Source credibility scoring
//!
//! Trusted sources carry their seeded weight. Everything else earns
//! credibility from its consensus track record, pulled toward a 0.5 prior
//! until five scans have accumulated.

use crate::memory::ReputationStore;
use std::collections::HashMap;

/// Scans below this count stay on the Bayesian ramp
const PRIOR_SCANS: f64 = 5.0;
const PRIOR_CREDIBILITY: f64 = 0.5;

/// Credibility for one source, in [0.1, 0.95]
pub async fn source_credibility(memory: &ReputationStore, source: &str) -> f64 {
    match memory.trusted_weight(source).await {
        Ok(Some(weight)) => return weight,
        Ok(None) => {}
        Err(e) => tracing::warn!("trusted-source lookup failed: {}", e),
    }

    match memory.get_profile(source).await {
        Ok(Some(profile)) => {
            let hits = profile.consensus_hits as f64;
            let scans = profile.total_scans as f64;
            if scans < PRIOR_SCANS {
                (PRIOR_CREDIBILITY * PRIOR_SCANS + hits) / (PRIOR_SCANS + scans)
            } else {
                (hits / scans).clamp(0.1, 0.9)
            }
        }
        Ok(None) => PRIOR_CREDIBILITY,
        Err(e) => {
            tracing::warn!("profile lookup failed: {}", e);
            PRIOR_CREDIBILITY
        }
    }
}

/// Per-item credibility for a batch of sources, one DB round-trip per
/// distinct source
pub async fn batch_credibility(memory: &ReputationStore, sources: &[String]) -> Vec<f64> {
    let mut by_source: HashMap<String, f64> = HashMap::new();
    let mut scores = Vec::with_capacity(sources.len());

    for source in sources {
        let key = source.to_lowercase();
        let score = match by_source.get(&key) {
            Some(&score) => score,
            None => {
                let score = source_credibility(memory, source).await;
                by_source.insert(key, score);
                score
            }
        };
        scores.push(score);
    }

    scores
}
