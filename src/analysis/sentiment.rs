//! Sentiment scoring
//!
//! The classifier is a capability: anything that labels a batch of texts
//! as positive / negative / neutral with a confidence. The bundled
//! implementation is a finance-news lexicon scorer; a neural model can be
//! swapped in behind the same trait.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classifier inputs are truncated to this many characters
pub const SENTIMENT_INPUT_CAP: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone)]
pub struct SentimentPrediction {
    pub label: SentimentLabel,
    /// Classifier confidence in [0, 1]
    pub score: f64,
}

#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentPrediction>>;
}

/// Map predictions onto signed scores: +score, -score or 0.0
pub fn signed_scores(predictions: &[SentimentPrediction]) -> Vec<f64> {
    predictions
        .iter()
        .map(|p| match p.label {
            SentimentLabel::Positive => p.score,
            SentimentLabel::Negative => -p.score,
            SentimentLabel::Neutral => 0.0,
        })
        .collect()
}

/// Run one truncated batch through the model. A failing classifier
/// degrades to all-neutral rather than failing the request.
pub async fn score_batch(model: &dyn SentimentModel, texts: &[String]) -> Vec<f64> {
    let truncated: Vec<String> = texts
        .iter()
        .map(|t| t.chars().take(SENTIMENT_INPUT_CAP).collect())
        .collect();

    match model.classify_batch(&truncated).await {
        Ok(predictions) => signed_scores(&predictions),
        Err(e) => {
            tracing::warn!("sentiment batch failed ({}), defaulting to neutral", e);
            vec![0.0; texts.len()]
        }
    }
}

/// Lexicon-based sentiment model for market news headlines
pub struct LexiconSentiment {
    lexicon: HashMap<String, f64>,
    boosters: HashMap<String, f64>,
    negations: Vec<String>,
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconSentiment {
    pub fn new() -> Self {
        let mut model = Self {
            lexicon: HashMap::new(),
            boosters: HashMap::new(),
            negations: Vec::new(),
        };
        model.init_lexicon();
        model
    }

    fn init_lexicon(&mut self) {
        let terms = [
            // Upside vocabulary of market coverage
            ("rally", 0.6),
            ("rallies", 0.6),
            ("surge", 0.7),
            ("surges", 0.7),
            ("soar", 0.7),
            ("soars", 0.7),
            ("jump", 0.5),
            ("jumps", 0.5),
            ("gain", 0.5),
            ("gains", 0.5),
            ("climb", 0.4),
            ("climbs", 0.4),
            ("rise", 0.4),
            ("rises", 0.4),
            ("rising", 0.4),
            ("record", 0.4),
            ("beat", 0.5),
            ("beats", 0.5),
            ("strong", 0.5),
            ("growth", 0.5),
            ("profit", 0.5),
            ("profits", 0.5),
            ("upgrade", 0.6),
            ("upgraded", 0.6),
            ("bullish", 0.7),
            ("breakout", 0.6),
            ("optimism", 0.6),
            ("optimistic", 0.6),
            ("recovery", 0.5),
            ("rebound", 0.5),
            ("boom", 0.6),
            ("outperform", 0.5),
            ("upbeat", 0.5),
            ("positive", 0.5),
            ("moon", 0.8),
            ("pump", 0.5),
            ("adoption", 0.5),
            // Downside vocabulary
            ("crash", -0.8),
            ("crashes", -0.8),
            ("plunge", -0.7),
            ("plunges", -0.7),
            ("collapse", -0.8),
            ("collapses", -0.8),
            ("tumble", -0.6),
            ("tumbles", -0.6),
            ("slump", -0.6),
            ("slumps", -0.6),
            ("sink", -0.5),
            ("sinks", -0.5),
            ("fall", -0.4),
            ("falls", -0.4),
            ("falling", -0.4),
            ("drop", -0.4),
            ("drops", -0.4),
            ("loss", -0.6),
            ("losses", -0.6),
            ("miss", -0.5),
            ("misses", -0.5),
            ("weak", -0.5),
            ("downgrade", -0.6),
            ("downgraded", -0.6),
            ("bearish", -0.7),
            ("recession", -0.7),
            ("crisis", -0.7),
            ("default", -0.6),
            ("bankruptcy", -0.8),
            ("fraud", -0.9),
            ("scam", -0.9),
            ("selloff", -0.6),
            ("panic", -0.7),
            ("fear", -0.5),
            ("warning", -0.4),
            ("risk", -0.3),
            ("negative", -0.5),
            ("liquidation", -0.6),
            ("dump", -0.6),
            ("bloodbath", -0.7),
        ];
        for (word, score) in terms {
            self.lexicon.insert(word.to_string(), score);
        }

        let boosters = [
            ("very", 1.3),
            ("sharply", 1.4),
            ("extremely", 1.5),
            ("massively", 1.4),
            ("heavily", 1.3),
            ("strongly", 1.3),
            ("record", 1.2),
        ];
        for (word, factor) in boosters {
            self.boosters.insert(word.to_string(), factor);
        }

        self.negations = [
            "not", "no", "never", "none", "isn't", "aren't", "wasn't", "won't", "doesn't",
            "don't", "didn't", "cannot", "can't",
        ]
        .iter()
        .map(|w| w.to_string())
        .collect();
    }

    /// Compound score in [-1, 1] for one text
    pub fn compound(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();

        let mut scores: Vec<f64> = Vec::new();
        for (i, raw) in words.iter().enumerate() {
            let word = clean_word(raw);
            if let Some(&score) = self.lexicon.get(&word) {
                scores.push(self.apply_modifiers(&words, i, score));
            }
        }

        if scores.is_empty() {
            return 0.0;
        }

        let sum: f64 = scores.iter().sum();
        // VADER-style normalization into [-1, 1]
        sum / (sum * sum + 15.0).sqrt()
    }

    /// Look back up to three words for boosters and negations
    fn apply_modifiers(&self, words: &[&str], index: usize, mut score: f64) -> f64 {
        let start = index.saturating_sub(3);
        for raw in &words[start..index] {
            let prev = clean_word(raw);
            if let Some(&factor) = self.boosters.get(&prev) {
                score *= factor;
            }
            if self.negations.contains(&prev) {
                score = -score * 0.8;
            }
        }
        score.clamp(-1.0, 1.0)
    }
}

fn clean_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'' || *c == '-')
        .collect::<String>()
        .to_lowercase()
}

#[async_trait]
impl SentimentModel for LexiconSentiment {
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentPrediction>> {
        Ok(texts
            .iter()
            .map(|text| {
                let compound = self.compound(text);
                if compound >= 0.05 {
                    SentimentPrediction {
                        label: SentimentLabel::Positive,
                        score: compound.abs(),
                    }
                } else if compound <= -0.05 {
                    SentimentPrediction {
                        label: SentimentLabel::Negative,
                        score: compound.abs(),
                    }
                } else {
                    SentimentPrediction {
                        label: SentimentLabel::Neutral,
                        score: 1.0 - compound.abs(),
                    }
                }
            })
            .collect())
    }
}
