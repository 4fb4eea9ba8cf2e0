//! Test doubles for the pipeline capabilities
//!
//! Deterministic embedder and sentiment stand-ins so pipeline behavior can
//! be asserted without model downloads or network access. Used by unit
//! tests and the end-to-end scenarios.

use crate::analysis::sentiment::{SentimentLabel, SentimentModel, SentimentPrediction};
use crate::embedding::{normalize, Embedder};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Dimensionality of mock vectors
const MOCK_DIM: usize = 32;

/// Hashing bag-of-words embedder: texts sharing most words land close in
/// cosine space, so near-identical headlines really do collide in dedup.
/// Individual texts can be scripted to exact vectors when a test needs a
/// precise similarity structure.
pub struct MockEmbedder {
    calls: Arc<AtomicUsize>,
    scripted: std::collections::HashMap<String, Vec<f32>>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            scripted: std::collections::HashMap::new(),
        }
    }

    /// Pin the (normalized) vector returned for an exact text
    pub fn script(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.scripted.insert(text.to_string(), normalize(vector));
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut buckets = vec![0.0f32; MOCK_DIM];
        for word in text.to_lowercase().split_whitespace() {
            let digest = md5::compute(word);
            let bucket = digest.0[0] as usize % MOCK_DIM;
            buckets[bucket] += 1.0;
        }
        normalize(buckets)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(vector) = self.scripted.get(text) {
            return Ok(vector.clone());
        }
        Ok(Self::vector_for(text))
    }
}

/// Keyword-driven sentiment: "surge"-style words read positive,
/// "crash"-style words negative, everything else neutral.
pub struct MockSentiment {
    positive_score: f64,
    negative_score: f64,
}

impl Default for MockSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSentiment {
    pub fn new() -> Self {
        Self {
            positive_score: 0.8,
            negative_score: 0.8,
        }
    }

    pub fn with_scores(positive_score: f64, negative_score: f64) -> Self {
        Self {
            positive_score,
            negative_score,
        }
    }
}

const POSITIVE_CUES: &[&str] = &["surge", "rally", "soar", "jump", "gain", "record"];
const NEGATIVE_CUES: &[&str] = &["crash", "plunge", "collapse", "panic", "selloff", "default"];

#[async_trait]
impl SentimentModel for MockSentiment {
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentPrediction>> {
        Ok(texts
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                if NEGATIVE_CUES.iter().any(|cue| lower.contains(cue)) {
                    SentimentPrediction {
                        label: SentimentLabel::Negative,
                        score: self.negative_score,
                    }
                } else if POSITIVE_CUES.iter().any(|cue| lower.contains(cue)) {
                    SentimentPrediction {
                        label: SentimentLabel::Positive,
                        score: self.positive_score,
                    }
                } else {
                    SentimentPrediction {
                        label: SentimentLabel::Neutral,
                        score: 0.9,
                    }
                }
            })
            .collect())
    }
}
