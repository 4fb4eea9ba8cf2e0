//! Telegram alert sink
//!
//! Best-effort outbound alerts for high-intensity or Eden verdicts.
//! Failures are logged and never propagate into the pipeline result.


use crate::error::Result;
use crate::types::AnalysisReport;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram notifier
#[derive(Clone)]
pub struct Notifier {
    http: Client,
    bot_token: String,
    chat_id: String,
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct TelegramMessage {
    chat_id: String,
    text: String,
}

impl Notifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        let http = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            bot_token,
            chat_id,
            enabled: true,
        }
    }

    /// No-op notifier for when Telegram is not configured
    pub fn disabled() -> Self {
        Self {
            http: Client::new(),
            bot_token: String::new(),
            chat_id: String::new(),
            enabled: false,
        }
    }

    /// Send a raw text message
    pub async fn send(&self, text: &str) -> Result<()> {
        if !self.enabled {
            tracing::debug!("Telegram not configured; skipping alert");
            return Ok(());
        }

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let msg = TelegramMessage {
            chat_id: self.chat_id.clone(),
            text: text.to_string(),
        };

        let response = self.http.post(&url).json(&msg).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                "Telegram send failed: status={} body={}",
                status,
                body.chars().take(500).collect::<String>()
            );
        }

        Ok(())
    }

    /// Fire one alert for a finished analysis; best-effort
    pub async fn verdict_alert(&self, query: &str, report: &AnalysisReport) {
        let text = format_alert(query, report);
        if let Err(e) = self.send(&text).await {
            tracing::warn!("alert delivery failed: {}", e);
        }
    }
}

fn format_alert(query: &str, report: &AnalysisReport) -> String {
    let mut text = format!(
        "Narrative alert for \"{}\"\nWinner: {} (intensity {:.2}, entropy {:.2})",
        query, report.verdict.winner_source, report.verdict.intensity, report.verdict.entropy,
    );

    if report.eden_signal.detected {
        if let Some(source) = &report.eden_signal.source {
            text.push_str(&format!(
                "\nEden signal: {} at trust {:.2}",
                source, report.eden_signal.confidence
            ));
        }
    }

    text.push_str(&format!("\n{}", report.summary));
    text
}
