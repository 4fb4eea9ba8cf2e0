//! Syndication feed fetcher
//!
//! Pulls one RSS/Atom URL and emits up to `limit` signals. The crypto
//! satellite uses the same fetcher with a query filter switched on.

use super::FetchSource;
use crate::error::Result;
use crate::types::Signal;
use async_trait::async_trait;
use feed_rs::model::Entry;
use reqwest::Client;
use std::io::Cursor;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Feed descriptions are capped to keep downstream inputs bounded
const DESCRIPTION_CAP: usize = 300;

pub struct FeedSource {
    http: Client,
    url: String,
    limit: usize,
    /// When set, only entries mentioning the query in title or summary pass
    query_filter: bool,
}

impl FeedSource {
    pub fn new(url: String, limit: usize) -> Self {
        Self::build(url, limit, false)
    }

    /// Variant that keeps only entries matching the query (case-insensitive)
    pub fn with_query_filter(url: String, limit: usize) -> Self {
        Self::build(url, limit, true)
    }

    fn build(url: String, limit: usize, query_filter: bool) -> Self {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            url,
            limit,
            query_filter,
        }
    }

    async fn fetch_inner(&self, query: &str) -> Result<Vec<Signal>> {
        let body = self.http.get(&self.url).send().await?.bytes().await?;
        let feed = feed_rs::parser::parse(Cursor::new(body))
            .map_err(|e| crate::error::RadarError::Api(format!("feed parse: {}", e)))?;

        let source = feed
            .title
            .map(|t| t.content)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "rss".to_string());

        let needle = query.to_lowercase();
        let signals = feed
            .entries
            .into_iter()
            .filter(|entry| !self.query_filter || entry_matches(entry, &needle))
            .take(self.limit)
            .map(|entry| {
                let title = entry
                    .title
                    .as_ref()
                    .map(|t| t.content.clone())
                    .unwrap_or_default();
                let description: String = entry_summary(&entry)
                    .chars()
                    .take(DESCRIPTION_CAP)
                    .collect();
                let url = entry_link(&entry);
                let published = entry
                    .published
                    .map(|d| d.to_rfc3339())
                    .unwrap_or_default();
                Signal::new(source.clone(), title, description, url, published)
            })
            .collect();

        Ok(signals)
    }
}

fn entry_summary(entry: &Entry) -> String {
    if let Some(summary) = &entry.summary {
        return summary.content.clone();
    }
    entry
        .content
        .as_ref()
        .and_then(|c| c.body.clone())
        .unwrap_or_default()
}

fn entry_link(entry: &Entry) -> String {
    // Prefer the "alternate" link, otherwise the first one
    if let Some(href) = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().unwrap_or("alternate") == "alternate")
        .map(|l| l.href.clone())
    {
        return href;
    }
    entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default()
}

fn entry_matches(entry: &Entry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.to_lowercase())
        .unwrap_or_default();
    if title.contains(needle) {
        return true;
    }
    entry_summary(entry).to_lowercase().contains(needle)
}

#[async_trait]
impl FetchSource for FeedSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch(&self, query: &str) -> Vec<Signal> {
        match self.fetch_inner(query).await {
            Ok(signals) => signals,
            Err(e) => {
                tracing::warn!(url = %self.url, "feed fetch failed: {}", e);
                Vec::new()
            }
        }
    }
}
