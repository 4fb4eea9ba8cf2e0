//! Analysis orchestrator
//!
//! Sequences the full pipeline for one query: cache lookup, tiered ingest,
//! claim extraction, embedding, dedup, scoring, arbitration, reputation
//! update, classification, UI assembly and the optional alert. Capabilities
//! (embedder, sentiment model, KV store, summarizer, alert sink) are
//! injected, so the same orchestrator runs against real models or test
//! doubles.

use crate::analysis::claims::batch_extract_claims;
use crate::analysis::cluster::cluster_vectors;
use crate::analysis::coordination::score_coordination;
use crate::analysis::credibility::batch_credibility;
use crate::analysis::dedupe::{dedupe_by_vectors, DEDUP_THRESHOLD};
use crate::analysis::hard_data::extract_hard_data;
use crate::analysis::psychology::analyze_psychology;
use crate::analysis::sentiment::{score_batch, SentimentModel};
use crate::arbitration::{
    global_entropy, select_winner, ArbitrationEngine, DEFAULT_COPY_THRESHOLD,
    INCONCLUSIVE_ENTROPY,
};
use crate::classify::{classify_action, is_panic};
use crate::config::Config;
use crate::embedding::{CachedEmbedder, Embedder, FastembedEmbedder};
use crate::error::Result;
use crate::ingest::TieredIngester;
use crate::memory::ReputationStore;
use crate::notify::Notifier;
use crate::storage::cache::ResultCache;
use crate::storage::KvStore;
use crate::summarize::{local_summary, LlmSummarizer, SummaryContext};
use crate::types::*;
use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Alerts fire above this winner intensity even without an Eden signal
const ALERT_INTENSITY: f64 = 0.6;

/// Winner similarity above which a source counts as agreeing
const CONSENSUS_SCORE: f64 = 0.85;

/// Winner trust above which the Eden heuristic can trigger
const EDEN_TRUST: f64 = 0.85;

/// Winner intensity below which a narrative counts as uncontested
const EDEN_MAX_INTENSITY: f64 = 0.5;

/// UI label length cap
const LABEL_CAP: usize = 50;

pub struct Orchestrator {
    ingester: TieredIngester,
    embedder: Arc<dyn Embedder>,
    sentiment: Arc<dyn SentimentModel>,
    memory: Arc<ReputationStore>,
    result_cache: ResultCache,
    notifier: Notifier,
    summarizer: Option<LlmSummarizer>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ingester: TieredIngester,
        embedder: Arc<dyn Embedder>,
        sentiment: Arc<dyn SentimentModel>,
        memory: Arc<ReputationStore>,
        kv: Arc<dyn KvStore>,
        notifier: Notifier,
        summarizer: Option<LlmSummarizer>,
    ) -> Self {
        Self {
            ingester,
            embedder,
            sentiment,
            memory,
            result_cache: ResultCache::new(kv),
            notifier,
            summarizer,
        }
    }

    /// Wire up the production capabilities from configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let kv = crate::storage::open_kv(config).await;
        let memory = Arc::new(ReputationStore::connect(&config.database.path).await?);

        let embedder: Arc<dyn Embedder> = Arc::new(CachedEmbedder::new(
            Arc::new(FastembedEmbedder::new()),
            Arc::clone(&kv),
        ));
        let sentiment: Arc<dyn SentimentModel> =
            Arc::new(crate::analysis::sentiment::LexiconSentiment::new());

        let notifier = match &config.telegram {
            Some(telegram) => Notifier::new(telegram.bot_token.clone(), telegram.chat_id.clone()),
            None => Notifier::disabled(),
        };
        let summarizer = config.llm.as_ref().map(LlmSummarizer::from_config);

        Ok(Self::new(
            TieredIngester::from_config(config),
            embedder,
            sentiment,
            memory,
            kv,
            notifier,
            summarizer,
        ))
    }

    pub fn memory(&self) -> &ReputationStore {
        &self.memory
    }

    /// Run the full pipeline for one query
    pub async fn run_query(&self, query: &str, use_llm: bool) -> Result<AnalysisOutcome> {
        let started = Instant::now();

        if let Some(report) = self.result_cache.get(query).await {
            return Ok(AnalysisOutcome::Success(Box::new(report)));
        }

        let signals = self.ingester.fetch_all(query).await;
        if signals.is_empty() {
            tracing::info!(query, "no signals from any tier");
            return Ok(AnalysisOutcome::NoData);
        }
        tracing::info!(query, count = signals.len(), "ingest complete");

        // Lead claims drive embedding; items with nothing claim-like are
        // dropped before the vector stage.
        let texts: Vec<String> = signals.iter().map(|s| s.text()).collect();
        let claims = batch_extract_claims(&texts);
        let items: Vec<(Signal, String)> = signals
            .into_iter()
            .zip(claims)
            .filter(|(_, claim)| !claim.trim().is_empty())
            .collect();
        if items.is_empty() {
            return Ok(AnalysisOutcome::Filtered);
        }

        let claim_texts: Vec<String> = items.iter().map(|(_, claim)| claim.clone()).collect();
        let vectors = self.embedder.embed_batch(&claim_texts).await?;
        let (items, vectors) = dedupe_by_vectors(items, vectors, DEDUP_THRESHOLD);
        if items.is_empty() {
            return Ok(AnalysisOutcome::Filtered);
        }

        let (signals, claims): (Vec<Signal>, Vec<String>) = items.into_iter().unzip();
        let retained_texts: Vec<String> = signals.iter().map(|s| s.text()).collect();
        let sources: Vec<String> = signals.iter().map(|s| s.source.clone()).collect();

        let sentiments = score_batch(self.sentiment.as_ref(), &retained_texts).await;
        let credibility = batch_credibility(&self.memory, &sources).await;
        let clusters = cluster_vectors(&vectors);

        let bundle = SignalBundle {
            signals,
            vectors,
            sentiments,
            credibility,
            clusters,
        };

        let verdicts =
            ArbitrationEngine::new(DEFAULT_COPY_THRESHOLD).analyze(&bundle.vectors, &sources);
        let winner = select_winner(&verdicts, &bundle.credibility);
        let winner_verdict = &verdicts[winner];
        let winner_source = bundle.signals[winner].source.clone();
        let entropy = global_entropy(&winner_verdict.source_scores);

        self.update_reputation(&bundle, &winner_source, winner_verdict)
            .await;

        let coordination = score_coordination(&sources);
        let psychology =
            analyze_psychology(&bundle.sentiments, winner_verdict.intensity, coordination);

        let winner_trust = bundle.credibility[winner];
        let eden_detected =
            winner_trust > EDEN_TRUST && winner_verdict.intensity < EDEN_MAX_INTENSITY;
        let eden_signal = EdenSignal {
            detected: eden_detected,
            source: eden_detected.then(|| winner_source.clone()),
            confidence: winner_trust,
        };

        let panic = is_panic(psychology.sentiment_score, winner_verdict.intensity);
        let action_signal =
            classify_action(winner_verdict.intensity, psychology.sentiment_score, panic);

        let hard_data = extract_hard_data(&retained_texts);
        let summary = self.summarize(query, &claims, &hard_data, use_llm).await;

        let verdict = VerdictSummary {
            winner_source: winner_source.clone(),
            intensity: winner_verdict.intensity,
            entropy,
            inconclusive: entropy > INCONCLUSIVE_ENTROPY,
        };

        let verdict_line = format!(
            "{} wins at intensity {:.2}, action {}",
            winner_source, winner_verdict.intensity, action_signal.code
        );
        if let Err(e) = self.memory.store_event(query, &hard_data, &verdict_line).await {
            tracing::warn!("event history write failed: {}", e);
        }

        let ui = assemble_ui(
            &bundle,
            &eden_signal,
            winner_verdict.intensity,
            entropy,
            &psychology,
            coordination,
            &summary,
            &hard_data,
            started,
        );

        let report = AnalysisReport {
            verdict,
            eden_signal,
            psychology,
            action_signal,
            summary,
            hard_data,
            ui,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        self.result_cache.put(query, &report).await;

        if report.eden_signal.detected || report.verdict.intensity > ALERT_INTENSITY {
            self.notifier.verdict_alert(query, &report).await;
        }

        Ok(AnalysisOutcome::Success(Box::new(report)))
    }

    /// One atomic counter bump per distinct retained source. A write
    /// failure skips the increment entirely so counters never tear.
    async fn update_reputation(
        &self,
        bundle: &SignalBundle,
        winner_source: &str,
        winner_verdict: &crate::arbitration::Verdict,
    ) {
        let mut seen: HashSet<String> = HashSet::new();
        for signal in &bundle.signals {
            if !seen.insert(signal.source.to_lowercase()) {
                continue;
            }

            let winner_score = winner_verdict
                .source_scores
                .get(&signal.source)
                .copied()
                .unwrap_or(0.0);
            let consensus = signal.source.eq_ignore_ascii_case(winner_source)
                || winner_score > CONSENSUS_SCORE;

            if let Err(e) = self.memory.record_scan(&signal.source, consensus).await {
                tracing::warn!("reputation update failed for {}: {}", signal.source, e);
            }
        }
    }

    async fn summarize(
        &self,
        query: &str,
        claims: &[String],
        hard_data: &HardData,
        use_llm: bool,
    ) -> String {
        if !use_llm {
            return local_summary(claims);
        }

        let Some(summarizer) = &self.summarizer else {
            return local_summary(claims);
        };

        let prior_events = match self.memory.similar_events(query, 2).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("similar-events lookup failed: {}", e);
                Vec::new()
            }
        };

        let context = SummaryContext {
            query,
            claims,
            hard_data,
            prior_events: &prior_events,
        };
        match summarizer.summarize(&context).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!("LLM summary failed ({}), using local summary", e);
                local_summary(claims)
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn assemble_ui(
    bundle: &SignalBundle,
    eden_signal: &EdenSignal,
    intensity: f64,
    entropy: f64,
    psychology: &crate::analysis::psychology::PsychologyReport,
    coordination: f64,
    summary: &str,
    hard_data: &HardData,
    started: Instant,
) -> UiPayload {
    let points = bundle
        .signals
        .iter()
        .enumerate()
        .map(|(i, signal)| ArbitragePoint {
            source: signal.source.clone(),
            sentiment: bundle.sentiments[i],
            credibility: bundle.credibility[i],
            label: signal.title.chars().take(LABEL_CAP).collect(),
        })
        .collect();

    let cluster_ids: usize = bundle.clusters.iter().copied().max().map_or(0, |m| m + 1);
    let mut clusters = Vec::with_capacity(cluster_ids);
    for id in 0..cluster_ids {
        let members: Vec<usize> = (0..bundle.len())
            .filter(|&i| bundle.clusters[i] == id)
            .collect();
        if members.is_empty() {
            continue;
        }

        let mut sources = Vec::new();
        for &i in &members {
            let source = &bundle.signals[i].source;
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
        let sentiment_avg =
            members.iter().map(|&i| bundle.sentiments[i]).sum::<f64>() / members.len() as f64;

        clusters.push(ClusterView {
            id,
            sources,
            sentiment_avg,
        });
    }

    let distinct_sources: HashSet<String> = bundle
        .signals
        .iter()
        .map(|s| s.source.to_lowercase())
        .collect();

    UiPayload {
        screen_arbitrage: ArbitrageScreen {
            points,
            eden_detected: eden_signal.detected,
            eden_source: eden_signal.source.clone(),
            intensity_score: intensity,
        },
        screen_intelligence: IntelligenceScreen {
            clusters,
            coordination_score: coordination,
        },
        screen_stress: StressScreen {
            entropy,
            mood: psychology.mood,
            is_trap: psychology.is_trap,
            is_crowded: psychology.is_crowded,
            asymmetry: psychology.asymmetry_level,
        },
        screen_portal: PortalScreen {
            summary: summary.to_string(),
            hard_data: hard_data.clone(),
            meta: PortalMeta {
                execution_time: format!("{:.2}s", started.elapsed().as_secs_f64()),
                sources_count: distinct_sources.len(),
            },
        },
    }
}
