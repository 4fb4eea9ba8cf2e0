//! Hard-data extraction
//!
//! Scans the raw texts for concrete numbers: percentage moves and monetary
//! amounts. Matches keep first-seen order so a cached payload re-serializes
//! identically.

use crate::types::HardData;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Keep at most this many matches per kind
const MAX_PER_KIND: usize = 10;

fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[+-]?\d+(?:\.\d+)?\s?%").expect("hard-coded pattern"))
}

fn monetary_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:[$€£]|USD|EUR|BRL)\s?\d+(?:\.\d+)?\s?(?:M|bn|k|million|billion)?")
            .expect("hard-coded pattern")
    })
}

pub fn extract_hard_data(texts: &[String]) -> HardData {
    let combined = texts.join(" ");

    HardData {
        percentages: unique_matches(percent_pattern(), &combined),
        monetary: unique_matches(monetary_pattern(), &combined),
        key_numbers: Vec::new(),
    }
}

fn unique_matches(pattern: &Regex, text: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut matches = Vec::new();

    for m in pattern.find_iter(text) {
        let value = m.as_str().to_string();
        if seen.insert(value.clone()) {
            matches.push(value);
            if matches.len() == MAX_PER_KIND {
                break;
            }
        }
    }

    matches
}

/// Render the extracted numbers for an LLM prompt
pub fn format_for_prompt(data: &HardData) -> String {
    if data.percentages.is_empty() && data.monetary.is_empty() {
        return "No concrete numeric data detected.".to_string();
    }

    let mut out = String::from("CONCRETE DATA DETECTED:\n");
    if !data.percentages.is_empty() {
        out.push_str(&format!("- Moves/percentages: {}\n", data.percentages.join(", ")));
    }
    if !data.monetary.is_empty() {
        out.push_str(&format!("- Monetary values: {}\n", data.monetary.join(", ")));
    }
    out
}
