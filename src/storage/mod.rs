//! Key-value storage backends
//!
//! The pipeline only needs get / setex / del over string keys and values.
//! Redis backs the shared deployment; an in-process TTL map covers local
//! runs and tests. Both are safe under concurrent writers.

pub mod cache;


use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::Arc;

/// Minimal string-keyed store with per-entry TTL
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
    async fn del(&self, key: &str) -> Result<()>;
}

/// Open the configured backend: Redis when a URL is set, memory otherwise
pub async fn open_kv(config: &Config) -> Arc<dyn KvStore> {
    if let Some(redis_config) = &config.redis {
        match RedisKv::connect(&redis_config.url).await {
            Ok(kv) => return Arc::new(kv),
            Err(e) => {
                tracing::warn!("Redis unavailable ({}), falling back to in-memory cache", e);
            }
        }
    }
    Arc::new(MemoryKv::new())
}

/// Entry with expiry time
#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// In-process TTL map
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries
    pub fn cleanup(&self) {
        let mut entries = self.entries.write();
        entries.retain(|_, entry| !entry.is_expired());
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read();
        Ok(entries.get(key).and_then(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.value.clone())
            }
        }))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Utc::now() + Duration::seconds(ttl_secs as i64),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write();
        entries.remove(key);
        Ok(())
    }
}

/// Redis-backed store
#[derive(Clone)]
pub struct RedisKv {
    conn: redis::aio::ConnectionManager,
}

impl RedisKv {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = redis::aio::ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
