//! Embedding capability and cache
//!
//! The embedder maps a text to a unit-L2 vector; inner product downstream
//! is therefore cosine similarity. The bundled implementation runs a local
//! fastembed model, lazily initialized once per process. A KV cache keyed
//! by content hash sits in front of it.

use crate::error::{RadarError, Result};
use crate::storage::KvStore;
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Cached vectors stay valid for a week
const EMBED_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// Dense-vector embedder. Deterministic and idempotent.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Unit-L2 vector for one text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Rescale to unit L2 norm; downstream code assumes this invariant
pub fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

/// Local fastembed model behind a one-shot initializer
pub struct FastembedEmbedder {
    model: OnceCell<TextEmbedding>,
}

impl Default for FastembedEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl FastembedEmbedder {
    pub fn new() -> Self {
        Self {
            model: OnceCell::new(),
        }
    }

    async fn model(&self) -> Result<&TextEmbedding> {
        self.model
            .get_or_try_init(|| async {
                tracing::info!("initializing embedding model");
                TextEmbedding::try_new(
                    InitOptions::new(EmbeddingModel::BGESmallENV15)
                        .with_show_download_progress(false),
                )
                .map_err(|e| RadarError::Embedding(e.to_string()))
            })
            .await
    }
}

#[async_trait]
impl Embedder for FastembedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let vectors = self.embed_batch(&texts).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| RadarError::Embedding("model returned no vector".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.model().await?;
        let embeddings = model
            .embed(texts.to_vec(), None)
            .map_err(|e| RadarError::Embedding(e.to_string()))?;
        Ok(embeddings.into_iter().map(normalize).collect())
    }
}

/// KV-backed memoization wrapper around any embedder
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    kv: Arc<dyn KvStore>,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, kv: Arc<dyn KvStore>) -> Self {
        Self { inner, kv }
    }

    fn cache_key(text: &str) -> String {
        format!("emb:{:x}", md5::compute(text.trim()))
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let key = Self::cache_key(text);

        match self.kv.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<f32>>(&raw) {
                Ok(vector) => return Ok(vector),
                Err(e) => tracing::warn!("discarding undecodable cached vector: {}", e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("embedding cache read failed: {}", e),
        }

        let vector = self.inner.embed(text).await?;

        // A failed store is logged and the vector still returned
        match serde_json::to_string(&vector) {
            Ok(raw) => {
                if let Err(e) = self.kv.set_ex(&key, &raw, EMBED_TTL_SECS).await {
                    tracing::warn!("embedding cache write failed: {}", e);
                }
            }
            Err(e) => tracing::warn!("embedding encode failed: {}", e),
        }

        Ok(vector)
    }
}
