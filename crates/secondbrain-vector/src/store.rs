//! The vector store trait and its record/error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use secondbrain_core::{Chunk, ChunkId, Hit, SourceId};

/// Errors from vector store operations.
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error("Vector store connection error: {0}")]
    Connection(String),

    #[error("Vector store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Object {0} conflicts with an existing object and has no id to replace")]
    Conflict(ChunkId),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for VectorError {
    fn from(e: reqwest::Error) -> Self {
        VectorError::Connection(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VectorError>;

/// A chunk embedding plus the properties stored alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    pub chunk_id: ChunkId,
    pub vector: Vec<f32>,
    pub text: String,
    pub source_id: SourceId,
    pub chunk_index: u32,
    pub page: Option<u32>,
}

impl VectorRecord {
    pub fn from_chunk(chunk: &Chunk, vector: Vec<f32>) -> Self {
        Self {
            chunk_id: chunk.id.clone(),
            vector,
            text: chunk.text.clone(),
            source_id: chunk.meta.source_id.clone(),
            chunk_index: chunk.meta.chunk_index,
            page: chunk.meta.page,
        }
    }
}

/// Storage backend for chunk embeddings.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace the record for `record.chunk_id`.
    async fn upsert(&self, record: &VectorRecord) -> Result<()>;

    /// Return up to `top_k` nearest records, closest first.
    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Hit>>;
}
