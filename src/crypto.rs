//! Crypto satellite
//!
//! Fast variant of the pipeline over a fixed list of crypto feeds: no
//! cache, no reputation writes, looser copy threshold to catch slang-level
//! rephrasings. Returns a compact report the front-end paints directly.

use crate::analysis::hard_data::extract_hard_data;
use crate::analysis::sentiment::{score_batch, SentimentModel};
use crate::arbitration::ArbitrationEngine;
use crate::classify::{classify_action, is_panic, ActionSignal};
use crate::config::CryptoConfig;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::ingest::feed::FeedSource;
use crate::ingest::FetchSource;
use crate::types::{HardData, Signal};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Looser threshold so reworded crypto coverage still counts as copying
pub const CRYPTO_COPY_THRESHOLD: f32 = 0.82;

/// Items taken per feed
const FEED_LIMIT: usize = 10;

/// Signals echoed back in the report
const MAX_REPORTED_SIGNALS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoMetrics {
    pub conflict_intensity: f64,
    pub sentiment_gap: f64,
    pub is_panic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoReport {
    pub status: String,
    pub asset: String,
    pub metrics: CryptoMetrics,
    pub action_signal: ActionSignal,
    pub hard_data: HardData,
    pub signals: Vec<Signal>,
}

pub struct CryptoSatellite {
    feeds: Vec<FeedSource>,
    engine: ArbitrationEngine,
    embedder: Arc<dyn Embedder>,
    sentiment: Arc<dyn SentimentModel>,
}

impl CryptoSatellite {
    pub fn new(
        config: &CryptoConfig,
        embedder: Arc<dyn Embedder>,
        sentiment: Arc<dyn SentimentModel>,
    ) -> Self {
        let feeds = config
            .feeds
            .iter()
            .map(|url| FeedSource::with_query_filter(url.clone(), FEED_LIMIT))
            .collect();

        Self {
            feeds,
            engine: ArbitrationEngine::new(CRYPTO_COPY_THRESHOLD),
            embedder,
            sentiment,
        }
    }

    /// Analyze one asset across the crypto feeds
    pub async fn run_analysis(&self, asset: &str) -> Result<CryptoReport> {
        let fetches = self.feeds.iter().map(|feed| feed.fetch(asset));
        let raw_signals: Vec<Signal> = join_all(fetches).await.into_iter().flatten().collect();

        if raw_signals.is_empty() {
            return Ok(no_data_report(asset));
        }

        let texts: Vec<String> = raw_signals.iter().map(|s| s.text()).collect();
        let sources: Vec<String> = raw_signals.iter().map(|s| s.source.clone()).collect();

        let vectors = self.embedder.embed_batch(&texts).await?;
        let sentiments = score_batch(self.sentiment.as_ref(), &texts).await;

        let verdicts = self.engine.analyze(&vectors, &sources);
        let max_conflict = verdicts
            .iter()
            .map(|v| v.intensity)
            .fold(0.0f64, f64::max);
        let avg_sentiment = if sentiments.is_empty() {
            0.0
        } else {
            sentiments.iter().sum::<f64>() / sentiments.len() as f64
        };

        let panic = is_panic(avg_sentiment, max_conflict);
        let action_signal = classify_action(max_conflict, avg_sentiment, panic);
        let hard_data = extract_hard_data(&texts);

        let mut signals = raw_signals;
        signals.truncate(MAX_REPORTED_SIGNALS);

        Ok(CryptoReport {
            status: "success".to_string(),
            asset: asset.to_uppercase(),
            metrics: CryptoMetrics {
                conflict_intensity: max_conflict,
                sentiment_gap: avg_sentiment,
                is_panic: panic,
            },
            action_signal,
            hard_data,
            signals,
        })
    }
}

fn no_data_report(asset: &str) -> CryptoReport {
    CryptoReport {
        status: "no_data".to_string(),
        asset: asset.to_uppercase(),
        metrics: CryptoMetrics {
            conflict_intensity: 0.0,
            sentiment_gap: 0.0,
            is_panic: false,
        },
        action_signal: ActionSignal::no_signal(),
        hard_data: HardData::default(),
        signals: Vec::new(),
    }
}
