//! Configuration management
//!
//! Layered: optional config file, then environment. Absent optional blocks
//! (NewsAPI, LLM, Telegram, Redis) disable the capability without failing.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub newsapi: Option<NewsApiConfig>,
    pub llm: Option<LlmConfig>,
    pub telegram: Option<TelegramConfig>,
    pub redis: Option<RedisConfig>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub crypto: CryptoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiConfig {
    /// API key for newsapi.org
    pub api_key: String,
    /// Maximum articles per request
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API key for the summarizer provider
    pub api_key: String,
    /// Model name (provider default when omitted)
    pub model: Option<String>,
    /// Base URL for OpenAI-compatible APIs
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    pub bot_token: String,
    /// Chat ID to send alerts to
    pub chat_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL, e.g. redis://localhost:6379/0
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "radar.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Tier-1 feeds, raced against the admission deadline
    #[serde(default = "default_tier1_feeds")]
    pub tier1_feeds: Vec<String>,
    /// Tier-2 fallback feeds
    #[serde(default = "default_tier2_feeds")]
    pub tier2_feeds: Vec<String>,
    /// Maximum items taken from a single feed
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            tier1_feeds: default_tier1_feeds(),
            tier2_feeds: default_tier2_feeds(),
            feed_limit: default_feed_limit(),
        }
    }
}

fn default_tier1_feeds() -> Vec<String> {
    vec![
        "https://feeds.reuters.com/reuters/businessNews".to_string(),
        "https://feeds.bloomberg.com/markets/news.rss".to_string(),
    ]
}

fn default_tier2_feeds() -> Vec<String> {
    vec![
        "https://finance.yahoo.com/news/rssindex".to_string(),
        "https://www.investing.com/rss/news.rss".to_string(),
    ]
}

fn default_feed_limit() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct CryptoConfig {
    /// Fixed feed list for the crypto satellite
    #[serde(default = "default_crypto_feeds")]
    pub feeds: Vec<String>,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            feeds: default_crypto_feeds(),
        }
    }
}

fn default_crypto_feeds() -> Vec<String> {
    vec![
        "https://cointelegraph.com/rss".to_string(),
        "https://cryptoslate.com/feed/".to_string(),
        "https://www.coindesk.com/arc/outboundfeeds/rss/".to_string(),
        "https://en.bitcoinsistemi.com/feed/".to_string(),
        "https://beincrypto.com/feed/".to_string(),
    ]
}

impl Config {
    /// Load configuration from a file plus RADAR_-prefixed env overrides
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_str().ok_or_else(|| {
            anyhow::anyhow!("config path is not valid UTF-8")
        })?;
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("RADAR").separator("__"))
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.overlay_well_known_env();
        Ok(config)
    }

    /// Load from default locations, falling back to environment only
    pub fn load_default() -> anyhow::Result<Self> {
        let paths = ["config.toml", "~/.config/narrative-radar/config.toml"];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        let mut config = Config::default();
        config.overlay_well_known_env();
        Ok(config)
    }

    /// Apply the conventional environment variables on top of whatever the
    /// file provided. Each one only fills a block that is still unset.
    fn overlay_well_known_env(&mut self) {
        if self.newsapi.is_none() {
            if let Ok(api_key) = std::env::var("NEWSAPI_KEY") {
                if !api_key.is_empty() {
                    self.newsapi = Some(NewsApiConfig {
                        api_key,
                        page_size: default_page_size(),
                    });
                }
            }
        }
        if self.llm.is_none() {
            if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
                if !api_key.is_empty() {
                    self.llm = Some(LlmConfig {
                        api_key,
                        model: None,
                        base_url: None,
                    });
                }
            }
        }
        if self.telegram.is_none() {
            if let (Ok(bot_token), Ok(chat_id)) =
                (std::env::var("TG_BOT_TOKEN"), std::env::var("TG_CHAT_ID"))
            {
                if !bot_token.is_empty() && !chat_id.is_empty() {
                    self.telegram = Some(TelegramConfig { bot_token, chat_id });
                }
            }
        }
        if self.redis.is_none() {
            if let Ok(url) = std::env::var("REDIS_URL") {
                if !url.is_empty() {
                    self.redis = Some(RedisConfig { url });
                }
            }
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database.path = url;
            }
        }
    }
}
