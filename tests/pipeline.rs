//! End-to-end pipeline scenarios
//!
//! Drives the orchestrator with scripted fetchers, a deterministic
//! embedder and a keyword sentiment model, covering the consensus,
//! fake-pump, panic, no-data and cache-hit paths.

use narrative_radar::analysis::credibility::source_credibility;
use narrative_radar::analysis::sentiment::SentimentModel;
use narrative_radar::ingest::mock::MockSource;
use narrative_radar::ingest::{FetchSource, TieredIngester};
use narrative_radar::memory::ReputationStore;
use narrative_radar::notify::Notifier;
use narrative_radar::orchestrator::Orchestrator;
use narrative_radar::storage::MemoryKv;
use narrative_radar::testing::{MockEmbedder, MockSentiment};
use narrative_radar::types::{AnalysisOutcome, AsymmetryLevel, Mood, Signal};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn signal(source: &str, title: &str) -> Signal {
    Signal::new(source, title, "background coverage without numbers", "https://example.com", "")
}

fn orchestrator(
    tier1: Vec<Arc<dyn FetchSource>>,
    embedder: MockEmbedder,
    sentiment: Arc<dyn SentimentModel>,
    memory: Arc<ReputationStore>,
) -> Orchestrator {
    Orchestrator::new(
        TieredIngester::new(tier1, vec![]),
        Arc::new(embedder),
        sentiment,
        memory,
        Arc::new(MemoryKv::new()),
        Notifier::disabled(),
        None,
    )
}

fn axis(dim: usize) -> Vec<f32> {
    let mut v = vec![0.0; 16];
    v[dim] = 1.0;
    v
}

// S1: three wire items with positive sentiment and moderate mutual
// similarity form a bullish consensus.
#[tokio::test]
async fn consensus_bullish_scenario() {
    let t1 = "Oil prices surge as OPEC extends output cuts";
    let t2 = "Crude rally gains momentum on tight global supply";
    let t3 = "Energy shares jump while investors expect stronger demand";

    let embedder = MockEmbedder::new()
        .script(t1, vec![1.0, 0.0, 0.0])
        .script(t2, vec![0.6, 0.8, 0.0])
        .script(t3, vec![0.6, 0.2, 0.7746]);

    let sources: Vec<Arc<dyn FetchSource>> = vec![Arc::new(MockSource::new(
        "wire",
        vec![
            signal("Reuters", t1),
            signal("Bloomberg Markets", t2),
            signal("Financial Times", t3),
        ],
    ))];

    let memory = Arc::new(ReputationStore::in_memory().await.unwrap());
    let pipeline = orchestrator(
        sources,
        embedder,
        Arc::new(MockSentiment::with_scores(0.7, 0.8)),
        memory,
    );

    let outcome = pipeline.run_query("oil", false).await.unwrap();
    let report = outcome.report().expect("expected a successful run");

    // The winner is one of the retained items' sources
    let retained: Vec<&str> = report
        .ui
        .screen_arbitrage
        .points
        .iter()
        .map(|p| p.source.as_str())
        .collect();
    assert!(retained.contains(&report.verdict.winner_source.as_str()));

    assert_eq!(report.psychology.mood, Mood::Euforia);
    assert!(["STRONG BUY", "HODL / WAIT"].contains(&report.action_signal.code.as_str()));

    // All three sources are trusted, so the Eden rule reduces to the
    // intensity check
    assert_eq!(
        report.eden_signal.detected,
        report.eden_signal.confidence > 0.85 && report.verdict.intensity < 0.5
    );
    assert!(report.eden_signal.detected);

    assert_eq!(report.ui.screen_portal.meta.sources_count, 3);
    assert!(!report.verdict.inconclusive);
    assert!(report.verdict.intensity >= 0.0 && report.verdict.intensity <= 1.0);
}

// S2: four near-identical items from one outlet plus an echo and an
// unrelated take read as a coordinated fake pump.
#[tokio::test]
async fn fake_pump_trap_scenario() {
    let pump = "Token price surge means everyone must buy now";
    let echo = "Analysts hail breakout surge as buyers pile in";
    let lone = "Veteran traders record gains chasing the same token";

    let embedder = MockEmbedder::new()
        .script(pump, vec![1.0, 0.0, 0.0])
        .script(echo, vec![0.9, 0.43589, 0.0])
        .script(lone, vec![0.0, 0.0, 1.0]);

    let mut signals = vec![
        signal("PumpDaily", pump),
        signal("PumpDaily", pump),
        signal("PumpDaily", pump),
        signal("PumpDaily", pump),
    ];
    signals.push(signal("EchoWire", echo));
    signals.push(signal("LoneWolf", lone));

    let sources: Vec<Arc<dyn FetchSource>> =
        vec![Arc::new(MockSource::new("crypto-blogs", signals))];

    let memory = Arc::new(ReputationStore::in_memory().await.unwrap());
    let pipeline = orchestrator(sources, embedder, Arc::new(MockSentiment::new()), memory);

    let outcome = pipeline.run_query("token", false).await.unwrap();
    let report = outcome.report().expect("expected a successful run");

    // The PumpDaily cluster collapses to a single survivor
    let pump_survivors = report
        .ui
        .screen_arbitrage
        .points
        .iter()
        .filter(|p| p.source == "PumpDaily")
        .count();
    assert!(pump_survivors <= 1);
    assert_eq!(report.ui.screen_arbitrage.points.len(), 3);

    assert!(report.ui.screen_intelligence.coordination_score >= 0.6);
    assert!(report.psychology.is_trap);
    assert_eq!(report.psychology.asymmetry_level, AsymmetryLevel::Alta);
    assert_eq!(report.action_signal.code, "TRAP / FAKE PUMP");
}

// S3: broadly negative coverage with a high-conflict winner aborts.
#[tokio::test]
async fn panic_scenario() {
    let mut embedder = MockEmbedder::new();
    let mut signals = Vec::new();

    for i in 0..10 {
        let title = format!("Market crash deepens as sector {} plunges sharply today", i);
        let vector = if i == 1 {
            let mut v = vec![0.0; 16];
            v[0] = 0.9;
            v[1] = 0.43589;
            v
        } else {
            axis(i)
        };
        embedder = embedder.script(&title, vector);
        signals.push(signal(&format!("Outlet{}", i), &title));
    }

    let sources: Vec<Arc<dyn FetchSource>> = vec![Arc::new(MockSource::new("wires", signals))];
    let memory = Arc::new(ReputationStore::in_memory().await.unwrap());
    let pipeline = orchestrator(sources, embedder, Arc::new(MockSentiment::new()), memory);

    let outcome = pipeline.run_query("market", false).await.unwrap();
    let report = outcome.report().expect("expected a successful run");

    assert_eq!(report.psychology.mood, Mood::Medo);
    assert!(report.psychology.sentiment_score < -0.35);
    assert!(report.verdict.intensity > 0.65);
    assert_eq!(report.action_signal.code, "ABORT / CRASH");
    assert_eq!(report.action_signal.color, "#FF0000");

    // High intensity also crosses the alerting threshold
    assert!(report.verdict.intensity > 0.6);
}

// S4: every tier empty -> NO_DATA, and nothing is persisted or cached.
#[tokio::test]
async fn no_data_scenario() {
    let empty = MockSource::new("empty", vec![]);
    let calls = empty.counter();

    let memory = Arc::new(ReputationStore::in_memory().await.unwrap());
    let pipeline = orchestrator(
        vec![Arc::new(empty)],
        MockEmbedder::new(),
        Arc::new(MockSentiment::new()),
        Arc::clone(&memory),
    );

    let outcome = pipeline.run_query("ghost topic", false).await.unwrap();
    assert!(matches!(outcome, AnalysisOutcome::NoData));
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        serde_json::json!({"error": "NO_DATA"})
    );

    // No reputation writes and no event history
    assert!(memory.similar_events("ghost", 10).await.unwrap().is_empty());

    // No cache entry either: a second identical query fetches again
    let outcome = pipeline.run_query("ghost topic", false).await.unwrap();
    assert!(matches!(outcome, AnalysisOutcome::NoData));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// S5: a repeated query inside the TTL touches no fetcher, no embedder and
// no reputation counters, and returns an identical payload.
#[tokio::test]
async fn cache_hit_scenario() {
    let t1 = "Oil prices surge as OPEC extends output cuts";
    let t2 = "Crude rally gains momentum on tight global supply";

    let embedder = MockEmbedder::new()
        .script(t1, vec![1.0, 0.0])
        .script(t2, vec![0.0, 1.0]);
    let embed_calls = embedder.counter();

    let source = MockSource::new(
        "wire",
        vec![signal("Reuters", t1), signal("Bloomberg Markets", t2)],
    );
    let fetch_calls = source.counter();

    let memory = Arc::new(ReputationStore::in_memory().await.unwrap());
    let pipeline = orchestrator(
        vec![Arc::new(source)],
        embedder,
        Arc::new(MockSentiment::new()),
        Arc::clone(&memory),
    );

    let first = pipeline.run_query("oil", false).await.unwrap();
    let fetches_after_first = fetch_calls.load(Ordering::SeqCst);
    let embeds_after_first = embed_calls.load(Ordering::SeqCst);
    let scans_after_first = memory
        .get_profile("reuters")
        .await
        .unwrap()
        .unwrap()
        .total_scans;

    let second = pipeline.run_query("oil", false).await.unwrap();

    assert_eq!(fetch_calls.load(Ordering::SeqCst), fetches_after_first);
    assert_eq!(embed_calls.load(Ordering::SeqCst), embeds_after_first);
    assert_eq!(
        memory
            .get_profile("reuters")
            .await
            .unwrap()
            .unwrap()
            .total_scans,
        scans_after_first
    );

    // Byte-identical payload on the cached path
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

// S6: an unknown source that keeps agreeing with the winner climbs above
// the 0.5 prior, monotonically.
#[tokio::test]
async fn unknown_source_ramp_up_scenario() {
    let memory = ReputationStore::in_memory().await.unwrap();

    assert_eq!(memory.trusted_weight("NewWire").await.unwrap(), None);
    let mut previous = source_credibility(&memory, "NewWire").await;
    assert_eq!(previous, 0.5);

    for _ in 0..3 {
        memory.record_scan("NewWire", true).await.unwrap();
        let credibility = source_credibility(&memory, "NewWire").await;
        assert!(credibility > previous);
        previous = credibility;
    }

    assert!(previous > 0.5);
}
