//! Market psychology report
//!
//! Crowd mood plus two structural flags: a crowded trade (strong consensus
//! with extreme emotion) and a narrative trap (coordinated sources with
//! extreme emotion).

use crate::types::{AsymmetryLevel, Mood};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsychologyReport {
    pub mood: Mood,
    pub sentiment_score: f64,
    pub is_crowded: bool,
    pub is_trap: bool,
    pub asymmetry_level: AsymmetryLevel,
}

pub fn analyze_psychology(
    sentiments: &[f64],
    verdict_intensity: f64,
    coordination_score: f64,
) -> PsychologyReport {
    let avg_sentiment = if sentiments.is_empty() {
        0.0
    } else {
        sentiments.iter().sum::<f64>() / sentiments.len() as f64
    };

    let is_crowded = verdict_intensity > 0.7 && avg_sentiment.abs() > 0.6;
    let is_trap = coordination_score > 0.5 && avg_sentiment.abs() > 0.7;

    let mood = if avg_sentiment > 0.2 {
        Mood::Euforia
    } else if avg_sentiment < -0.2 {
        Mood::Medo
    } else {
        Mood::Neutro
    };

    // High asymmetry marks a market worth attention, profitable or hostile
    let asymmetry_level = if is_trap || !is_crowded {
        AsymmetryLevel::Alta
    } else {
        AsymmetryLevel::Baixa
    };

    PsychologyReport {
        mood,
        sentiment_score: (avg_sentiment * 1000.0).round() / 1000.0,
        is_crowded,
        is_trap,
        asymmetry_level,
    }
}
