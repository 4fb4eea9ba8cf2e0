//! Result cache
//!
//! Short-TTL memoization of the full pipeline output, keyed by the
//! normalized query. Errors are logged and swallowed: a broken cache never
//! fails a request.

use crate::storage::KvStore;
use crate::types::AnalysisReport;
use std::sync::Arc;

/// Seconds a finished analysis stays valid
const RESULT_TTL_SECS: u64 = 600;

#[derive(Clone)]
pub struct ResultCache {
    kv: Arc<dyn KvStore>,
}

impl ResultCache {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn cache_key(query: &str) -> String {
        let normalized = query.trim().to_lowercase();
        format!("radar:analysis:{:x}", md5::compute(normalized))
    }

    /// Stored report for this query, if one is still fresh
    pub async fn get(&self, query: &str) -> Option<AnalysisReport> {
        let key = Self::cache_key(query);
        match self.kv.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(report) => {
                    tracing::info!(query, "result cache hit");
                    Some(report)
                }
                Err(e) => {
                    tracing::warn!("discarding undecodable cache entry: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("result cache read failed: {}", e);
                None
            }
        }
    }

    /// Store a finished report for 10 minutes
    pub async fn put(&self, query: &str, report: &AnalysisReport) {
        let key = Self::cache_key(query);
        let raw = match serde_json::to_string(report) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("result cache encode failed: {}", e);
                return;
            }
        };
        if let Err(e) = self.kv.set_ex(&key, &raw, RESULT_TTL_SECS).await {
            tracing::warn!("result cache write failed: {}", e);
        }
    }
}
