//! NewsAPI fetcher
//!
//! One GET against the everything endpoint, newest first. Any failure is
//! logged and swallowed; the coordinator only ever sees a list.

use super::FetchSource;
use crate::error::Result;
use crate::types::Signal;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct NewsApiSource {
    http: Client,
    api_key: String,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    articles: Option<Vec<NewsApiArticle>>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    source: NewsApiArticleSource,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticleSource {
    name: Option<String>,
}

impl NewsApiSource {
    pub fn new(api_key: String, page_size: u32) -> Self {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_key,
            page_size,
        }
    }

    async fn fetch_inner(&self, query: &str) -> Result<Vec<Signal>> {
        let page_size = self.page_size.to_string();
        let response = self
            .http
            .get(NEWSAPI_URL)
            .query(&[
                ("q", query),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("sortBy", "publishedAt"),
            ])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let body: NewsApiResponse = response.json().await?;
        if body.status != "ok" {
            return Err(crate::error::RadarError::Api(format!(
                "NewsAPI error: {} - {}",
                body.code.unwrap_or_default(),
                body.message.unwrap_or_default()
            )));
        }

        let signals = body
            .articles
            .unwrap_or_default()
            .into_iter()
            .map(|article| {
                Signal::new(
                    article
                        .source
                        .name
                        .unwrap_or_else(|| "unknown".to_string()),
                    article.title.unwrap_or_default(),
                    article.description.unwrap_or_default(),
                    article.url.unwrap_or_default(),
                    article.published_at.unwrap_or_default(),
                )
            })
            .collect();

        Ok(signals)
    }
}

#[async_trait]
impl FetchSource for NewsApiSource {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn fetch(&self, query: &str) -> Vec<Signal> {
        match self.fetch_inner(query).await {
            Ok(signals) => signals,
            Err(e) => {
                tracing::warn!("NewsAPI fetch failed: {}", e);
                Vec::new()
            }
        }
    }
}
