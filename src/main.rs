//! Narrative radar CLI
//!
//! Runs the analysis pipeline against a query, the crypto satellite
//! against an asset, or inspects the persistent reputation memory.

use clap::{Parser, Subcommand};
use narrative_radar::{
    analysis::sentiment::LexiconSentiment,
    config::Config,
    crypto::CryptoSatellite,
    embedding::{CachedEmbedder, FastembedEmbedder},
    orchestrator::Orchestrator,
    types::AnalysisOutcome,
};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "narrative-radar")]
#[command(about = "Market narrative intelligence pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the narrative landscape for a free-text query
    Analyze {
        /// Search query, e.g. "oil OR OPEC"
        query: String,
        /// Delegate the summary to the configured LLM
        #[arg(long)]
        llm: bool,
    },
    /// Run the crypto satellite for an asset
    Crypto {
        /// Asset symbol or name, e.g. BTC
        asset: String,
    },
    /// Show the reputation profile of a source
    Profile {
        /// Source name, e.g. Reuters
        source: String,
    },
    /// List recent analyses matching a query substring
    History {
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)?
    } else {
        Config::load_default()?
    };

    match cli.command {
        Commands::Analyze { query, llm } => analyze(config, &query, llm).await,
        Commands::Crypto { asset } => crypto(config, &asset).await,
        Commands::Profile { source } => profile(config, &source).await,
        Commands::History { query } => history(config, &query).await,
    }
}

async fn analyze(config: Config, query: &str, use_llm: bool) -> anyhow::Result<()> {
    tracing::info!(query, "starting analysis");

    let orchestrator = Orchestrator::from_config(&config).await?;
    let outcome = orchestrator.run_query(query, use_llm).await?;

    match &outcome {
        AnalysisOutcome::Success(report) => {
            println!("=== VERDICT ===");
            println!("Winning source:  {}", report.verdict.winner_source);
            println!("Intensity:       {:.4}", report.verdict.intensity);
            println!("Entropy:         {:.4}", report.verdict.entropy);
            println!("Inconclusive:    {}", report.verdict.inconclusive);
            println!(
                "Action:          {} ({})",
                report.action_signal.code, report.action_signal.icon
            );

            if report.eden_signal.detected {
                println!("\n*** EDEN INSIGHT DETECTED ***");
                if let Some(source) = &report.eden_signal.source {
                    println!(
                        "Signal source: {} (trust {:.2})",
                        source, report.eden_signal.confidence
                    );
                }
            }

            println!("\n=== STRATEGIC SUMMARY ===\n{}", report.summary);
        }
        _ => {}
    }

    println!("\n{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn crypto(config: Config, asset: &str) -> anyhow::Result<()> {
    let kv = narrative_radar::storage::open_kv(&config).await;
    let embedder = Arc::new(CachedEmbedder::new(Arc::new(FastembedEmbedder::new()), kv));
    let satellite = CryptoSatellite::new(&config.crypto, embedder, Arc::new(LexiconSentiment::new()));

    let report = satellite.run_analysis(asset).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn profile(config: Config, source: &str) -> anyhow::Result<()> {
    let memory = narrative_radar::memory::ReputationStore::connect(&config.database.path).await?;

    if let Some(weight) = memory.trusted_weight(source).await? {
        println!("{} is a trusted source (weight {:.2})", source, weight);
    }

    match memory.get_profile(source).await? {
        Some(profile) => {
            println!(
                "{}: {} scans, {} consensus hits (updated {})",
                profile.source, profile.total_scans, profile.consensus_hits, profile.updated_at
            );
        }
        None => println!("No profile recorded for {}", source),
    }
    Ok(())
}

async fn history(config: Config, query: &str) -> anyhow::Result<()> {
    let memory = narrative_radar::memory::ReputationStore::connect(&config.database.path).await?;
    let events = memory.similar_events(query, 10).await?;

    if events.is_empty() {
        println!("No past analyses match \"{}\"", query);
        return Ok(());
    }
    for event in events {
        println!("[{}] {} -> {}", event.created_at, event.query, event.verdict_summary);
    }
    Ok(())
}
