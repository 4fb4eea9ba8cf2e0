//! Signal ingestion
//!
//! Fetches news items from heterogeneous sources under a tiered admission
//! policy: Tier-1 wire feeds are raced against a short deadline, and Tier-2
//! only runs when Tier-1 cannot establish enough confidence on its own.

pub mod feed;
pub mod mock;
pub mod newsapi;


use crate::config::Config;
use crate::types::Signal;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// How long Tier-1 gets before the admission decision
const TIER1_DEADLINE: Duration = Duration::from_secs(2);

/// Minimum wire-service fraction for fail-fast admission
const CONFIDENCE_GATE: f64 = 0.9;

/// The two most-trusted wire services, matched by substring
const WIRE_SERVICES: &[&str] = &["reuters", "bloomberg"];

/// A single news source.
///
/// Fetchers are independent, idempotent and safe to cancel. They never
/// fail: any error is logged at warn and surfaces as an empty list.
#[async_trait]
pub trait FetchSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &str;

    /// Fetch signals for a query
    async fn fetch(&self, query: &str) -> Vec<Signal>;
}

/// Fraction of signals coming from the wire services, in [0, 1]
pub fn wire_confidence(signals: &[Signal]) -> f64 {
    let wire = signals
        .iter()
        .filter(|s| {
            let source = s.source.to_lowercase();
            WIRE_SERVICES.iter().any(|w| source.contains(w))
        })
        .count();
    (wire as f64 / signals.len().max(1) as f64).clamp(0.0, 1.0)
}

/// Tiered fan-out coordinator
pub struct TieredIngester {
    tier1: Vec<Arc<dyn FetchSource>>,
    tier2: Vec<Arc<dyn FetchSource>>,
}

impl TieredIngester {
    pub fn new(tier1: Vec<Arc<dyn FetchSource>>, tier2: Vec<Arc<dyn FetchSource>>) -> Self {
        Self { tier1, tier2 }
    }

    /// Build the default tiers: NewsAPI (when a key is configured) plus the
    /// Tier-1 wire feeds, with the Tier-2 fallback feeds behind them.
    pub fn from_config(config: &Config) -> Self {
        let mut tier1: Vec<Arc<dyn FetchSource>> = Vec::new();
        if let Some(newsapi) = &config.newsapi {
            tier1.push(Arc::new(newsapi::NewsApiSource::new(
                newsapi.api_key.clone(),
                newsapi.page_size,
            )));
        }
        for url in &config.ingest.tier1_feeds {
            tier1.push(Arc::new(feed::FeedSource::new(
                url.clone(),
                config.ingest.feed_limit,
            )));
        }

        let tier2 = config
            .ingest
            .tier2_feeds
            .iter()
            .map(|url| {
                Arc::new(feed::FeedSource::new(url.clone(), config.ingest.feed_limit))
                    as Arc<dyn FetchSource>
            })
            .collect();

        Self::new(tier1, tier2)
    }

    /// Run the tiered fetch for one query.
    ///
    /// Tier-1 launches concurrently and gets until the first completion or
    /// the 2 s deadline, whichever comes first. If anything arrived and the
    /// wire-service confidence clears the gate, pending Tier-1 fetchers are
    /// cancelled and their sockets released. Otherwise Tier-2 joins the same
    /// set, so Tier-1 stragglers finishing late are still admitted.
    pub async fn fetch_all(&self, query: &str) -> Vec<Signal> {
        let mut set = JoinSet::new();
        for source in &self.tier1 {
            Self::spawn_fetch(&mut set, source, query);
        }

        let mut signals: Vec<Signal> = Vec::new();

        let deadline = tokio::time::sleep(TIER1_DEADLINE);
        tokio::pin!(deadline);
        tokio::select! {
            joined = set.join_next() => {
                if let Some(result) = joined {
                    Self::admit(result, &mut signals);
                }
            }
            _ = &mut deadline => {}
        }
        while let Some(result) = set.try_join_next() {
            Self::admit(result, &mut signals);
        }

        let confidence = wire_confidence(&signals);
        if !signals.is_empty() && confidence >= CONFIDENCE_GATE {
            tracing::info!(
                confidence,
                items = signals.len(),
                "tier-1 admission passed, skipping tier-2"
            );
            set.abort_all();
            while let Some(result) = set.join_next().await {
                Self::admit(result, &mut signals);
            }
            return signals;
        }

        tracing::debug!(
            confidence,
            items = signals.len(),
            "tier-1 confidence below gate, escalating to tier-2"
        );
        for source in &self.tier2 {
            Self::spawn_fetch(&mut set, source, query);
        }
        while let Some(result) = set.join_next().await {
            Self::admit(result, &mut signals);
        }

        signals
    }

    fn spawn_fetch(set: &mut JoinSet<Vec<Signal>>, source: &Arc<dyn FetchSource>, query: &str) {
        let source = Arc::clone(source);
        let query = query.to_string();
        set.spawn(async move { source.fetch(&query).await });
    }

    /// Fold one task result in. Cancelled fetchers are expected on the
    /// fail-fast path; a panicked fetcher contributes nothing and must not
    /// abort the request.
    fn admit(result: Result<Vec<Signal>, tokio::task::JoinError>, signals: &mut Vec<Signal>) {
        match result {
            Ok(fetched) => signals.extend(fetched),
            Err(e) if e.is_cancelled() => {}
            Err(e) => tracing::warn!("fetcher task failed: {}", e),
        }
    }
}
