//! Narrative summarization
//!
//! Two paths: a local extractive summary that strips stopwords from the
//! top claims, and a strategic analysis delegated to an OpenAI-compatible
//! LLM. The LLM may fail; callers fall back to the local path.

use crate::analysis::hard_data::format_for_prompt;
use crate::config::LlmConfig;
use crate::error::{RadarError, Result};
use crate::memory::EventRecord;
use crate::types::HardData;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Words per claim kept in the local summary
const HEAD_WORDS: usize = 18;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "of", "to", "in", "on", "for", "as", "at", "by",
    "with", "is", "are", "was", "were", "be", "been", "being", "that", "this", "these",
    "it", "its", "from", "after", "before", "has", "have", "had", "will", "would", "into",
    "over", "about", "their", "they", "his", "her",
];

/// Everything the strategic summarizer gets to see
pub struct SummaryContext<'a> {
    pub query: &'a str,
    pub claims: &'a [String],
    pub hard_data: &'a HardData,
    pub prior_events: &'a [EventRecord],
}

/// Stopword-stripped head of the top three claims
pub fn local_summary(claims: &[String]) -> String {
    let lines: Vec<String> = claims
        .iter()
        .filter(|claim| !claim.trim().is_empty())
        .take(3)
        .map(|claim| {
            claim
                .split_whitespace()
                .filter(|word| {
                    let cleaned: String = word
                        .chars()
                        .filter(|c| c.is_alphanumeric())
                        .collect::<String>()
                        .to_lowercase();
                    !STOPWORDS.contains(&cleaned.as_str())
                })
                .take(HEAD_WORDS)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    if lines.is_empty() {
        "No narrative summary available.".to_string()
    } else {
        lines.join("; ")
    }
}

/// OpenAI-compatible strategic summarizer
pub struct LlmSummarizer {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl LlmSummarizer {
    pub fn from_config(config: &LlmConfig) -> Self {
        let http = Client::builder()
            .timeout(LLM_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// One-shot strategic analysis of the bundle
    pub async fn summarize(&self, context: &SummaryContext<'_>) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a market intelligence analyst. Write a terse strategic \
                              read of the narrative landscape in at most five sentences. \
                              Report narrative structure, not investment advice."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(context),
                },
            ],
            temperature: 0.3,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RadarError::Summarizer(format!(
                "LLM returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| RadarError::Summarizer("LLM returned no choices".to_string()))
    }
}

fn build_prompt(context: &SummaryContext<'_>) -> String {
    let mut prompt = format!("Topic under analysis: {}\n\nClaims in play:\n", context.query);
    for claim in context.claims.iter().take(8) {
        prompt.push_str(&format!("- {}\n", claim));
    }

    prompt.push('\n');
    prompt.push_str(&format_for_prompt(context.hard_data));

    if !context.prior_events.is_empty() {
        prompt.push_str("\nRelated past analyses:\n");
        for event in context.prior_events {
            prompt.push_str(&format!("- {}: {}\n", event.query, event.verdict_summary));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_summary_strips_stopwords() {
        let claims = vec![
            "The oil price is rising after the OPEC meeting".to_string(),
            "Banks are cutting their exposure to energy".to_string(),
        ];
        let summary = local_summary(&claims);

        assert!(summary.contains("oil price rising"));
        assert!(!summary.contains("the "));
        assert!(summary.contains("; "));
    }

    #[test]
    fn test_local_summary_takes_top_three() {
        let claims: Vec<String> = (0..6).map(|i| format!("claim number {}", i)).collect();
        let summary = local_summary(&claims);
        assert!(summary.contains("claim number 2"));
        assert!(!summary.contains("claim number 3"));
    }

    #[test]
    fn test_local_summary_empty_input() {
        assert_eq!(local_summary(&[]), "No narrative summary available.");
        assert_eq!(
            local_summary(&["   ".to_string()]),
            "No narrative summary available."
        );
    }

    #[test]
    fn test_prompt_carries_context() {
        let hard_data = HardData {
            percentages: vec!["+5%".to_string()],
            monetary: vec![],
            key_numbers: vec![],
        };
        let events = vec![EventRecord {
            query: "oil".to_string(),
            hard_data: "{}".to_string(),
            verdict_summary: "consensus bullish".to_string(),
            created_at: 0,
        }];
        let claims = vec!["OPEC extends cuts".to_string()];

        let prompt = build_prompt(&SummaryContext {
            query: "oil OR OPEC",
            claims: &claims,
            hard_data: &hard_data,
            prior_events: &events,
        });

        assert!(prompt.contains("oil OR OPEC"));
        assert!(prompt.contains("OPEC extends cuts"));
        assert!(prompt.contains("+5%"));
        assert!(prompt.contains("consensus bullish"));
    }
}
