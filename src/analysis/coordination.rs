//! Coordination scoring
//!
//! Measures how much the top three sources dominate a bundle. A score near
//! 1.0 means a few outlets produced almost everything, the usual shape of
//! amplification campaigns.

use std::collections::HashMap;

/// Share of all items carried by the three most frequent sources, in [0, 1]
pub fn score_coordination(sources: &[String]) -> f64 {
    if sources.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for source in sources {
        *counts.entry(source.as_str()).or_insert(0) += 1;
    }

    let mut occurrences: Vec<usize> = counts.into_values().collect();
    occurrences.sort_unstable_by(|a, b| b.cmp(a));

    let top_sum: usize = occurrences.iter().take(3).sum();
    top_sum as f64 / sources.len() as f64
}
