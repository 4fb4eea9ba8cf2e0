//! Shared pipeline types
//!
//! Request-scoped data (signals, bundles) plus the serializable result
//! payload consumed by the UI screens.

use serde::{Deserialize, Serialize};
use serde::ser::SerializeMap;

/// A fetched news item. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Publishing source name (free text, lowercased for lookups)
    pub source: String,
    pub title: String,
    pub description: String,
    pub url: String,
    /// Opaque publication timestamp as reported by the upstream feed
    pub published_at: String,
}

impl Signal {
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        published_at: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            description: description.into(),
            url: url.into(),
            published_at: published_at.into(),
        }
    }

    /// Full text used for embedding and sentiment scoring
    pub fn text(&self) -> String {
        format!("{} . {}", self.title, self.description)
    }
}

/// Retained signals and their per-item scores for one request.
///
/// Invariant: all sub-arrays have the same length after deduplication, and
/// position `i` refers to the same item in each of them.
#[derive(Debug, Clone, Default)]
pub struct SignalBundle {
    pub signals: Vec<Signal>,
    pub vectors: Vec<Vec<f32>>,
    pub sentiments: Vec<f64>,
    pub credibility: Vec<f64>,
    pub clusters: Vec<usize>,
}

impl SignalBundle {
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Crowd mood derived from mean sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Euforia,
    Medo,
    Neutro,
}

/// Narrative asymmetry: high asymmetry marks an interesting (or dangerous) setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsymmetryLevel {
    #[serde(rename = "ALTA")]
    Alta,
    #[serde(rename = "BAIXA")]
    Baixa,
}

/// Arbitration outcome for the whole bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictSummary {
    pub winner_source: String,
    pub intensity: f64,
    pub entropy: f64,
    /// True when the winner's support is spread too thin to call
    pub inconclusive: bool,
}

/// A credible but uncontested narrative the market has not priced in yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdenSignal {
    pub detected: bool,
    pub source: Option<String>,
    pub confidence: f64,
}

/// Numeric facts pulled out of the raw texts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardData {
    pub percentages: Vec<String>,
    pub monetary: Vec<String>,
    pub key_numbers: Vec<String>,
}

/// One plotted item on the arbitrage radar screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitragePoint {
    pub source: String,
    pub sentiment: f64,
    pub credibility: f64,
    /// Truncated headline, at most 50 chars
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageScreen {
    pub points: Vec<ArbitragePoint>,
    pub eden_detected: bool,
    pub eden_source: Option<String>,
    pub intensity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterView {
    pub id: usize,
    pub sources: Vec<String>,
    pub sentiment_avg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceScreen {
    pub clusters: Vec<ClusterView>,
    pub coordination_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressScreen {
    pub entropy: f64,
    pub mood: Mood,
    pub is_trap: bool,
    pub is_crowded: bool,
    pub asymmetry: AsymmetryLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalMeta {
    /// Wall-clock pipeline duration formatted as "X.XXs"
    pub execution_time: String,
    pub sources_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalScreen {
    pub summary: String,
    pub hard_data: HardData,
    pub meta: PortalMeta,
}

/// The four UI screens assembled by the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiPayload {
    pub screen_arbitrage: ArbitrageScreen,
    pub screen_intelligence: IntelligenceScreen,
    pub screen_stress: StressScreen,
    pub screen_portal: PortalScreen,
}

/// Full successful pipeline output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub verdict: VerdictSummary,
    pub eden_signal: EdenSignal,
    pub psychology: crate::analysis::psychology::PsychologyReport,
    pub action_signal: crate::classify::ActionSignal,
    pub summary: String,
    pub hard_data: HardData,
    pub ui: UiPayload,
    /// ISO-8601 UTC completion time
    pub timestamp: String,
}

/// Top-level pipeline result
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Success(Box<AnalysisReport>),
    /// Every tier came back empty
    NoData,
    /// Items were fetched but none survived deduplication
    Filtered,
}

impl AnalysisOutcome {
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Success(_) => None,
            Self::NoData => Some("NO_DATA"),
            Self::Filtered => Some("FILTERED"),
        }
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Success(report) => Some(report),
            _ => None,
        }
    }
}

impl Serialize for AnalysisOutcome {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Success(report) => report.serialize(serializer),
            Self::NoData | Self::Filtered => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", self.error_code().unwrap_or_default())?;
                map.end()
            }
        }
    }
}
