//! Text embedding providers.
//!
//! [`HashEmbedder`] is deterministic and offline: identical text always maps
//! to the identical vector, which is enough for exact and near-duplicate
//! lookups in development. [`OpenAiEmbedder`] calls any OpenAI-compatible
//! `/embeddings` endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use secondbrain_core::config::{EmbeddingConfig, EmbeddingProvider};

use crate::error::{AgentError, Result};

/// Maps texts to fixed-length vectors, one per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Length of every vector this embedder returns.
    fn dim(&self) -> usize;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_texts(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| AgentError::Embedding("provider returned no vectors".to_string()))
    }
}

/// Build the embedder selected by configuration.
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::Hash => Ok(Arc::new(HashEmbedder::new(config.dim))),
        EmbeddingProvider::OpenAi => Ok(Arc::new(OpenAiEmbedder::new(config)?)),
    }
}

// ── Hash ──────────────────────────────────────────────────────────

/// MD5 digest bytes scaled to `[0, 1]`, repeated cyclically up to `dim`.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let digest = md5::compute(text.as_bytes());
        digest
            .0
            .iter()
            .cycle()
            .take(self.dim)
            .map(|b| f32::from(*b) / 255.0)
            .collect()
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(128)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_sync(t)).collect())
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

// ── OpenAI-compatible ─────────────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    dim: usize,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AgentError::Config("embedding.api_key is required for the openai provider".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Embedding(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            dim: config.dim,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| AgentError::Embedding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Embedding(format!("{status}: {body}")));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Embedding(e.to_string()))?;

        if parsed.data.len() != texts.len() {
            return Err(AgentError::Embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        tracing::debug!(count = parsed.data.len(), model = %self.model, "Embeddings generated");
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dim(&self) -> usize {
        self.dim
    }
}
