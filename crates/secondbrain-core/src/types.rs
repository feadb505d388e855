//! Core domain types for the secondbrain memory store.
//!
//! A source document is split into chunks; chunks are embedded, indexed in
//! the vector store, persisted as JSON, and optionally mirrored into the
//! knowledge graph. Retrieval produces hits, which the composer turns into
//! an answer with source references.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identifiers ───────────────────────────────────────────────────

/// Identifies one ingested document (an upload filename or a generated id).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SourceId(pub String);

impl SourceId {
    /// Generate an id of the form `{prefix}-{8 hex chars}`.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", short_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a chunk: `{source_id}::chunk::{index}::{8 hex chars}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ChunkId(pub String);

impl ChunkId {
    pub fn new(source_id: &SourceId, chunk_index: u32) -> Self {
        Self(format!("{source_id}::chunk::{chunk_index}::{}", short_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First 8 hex chars of a random v4 UUID.
fn short_hex() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

// ── Chunks ────────────────────────────────────────────────────────

/// Metadata attached to a chunk.
///
/// Every field has a default so older or hand-edited chunk files still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkMeta {
    pub source_id: SourceId,
    /// Position within the source (per page for PDFs). Not renumbered after merges.
    pub chunk_index: u32,
    /// Zero-based page index for PDF sources.
    pub page: Option<u32>,
    /// Length of the chunk text in characters.
    pub char_len: usize,
    pub ingested_at: Option<DateTime<Utc>>,
}

/// A piece of a source document small enough to embed and retrieve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub meta: ChunkMeta,
}

impl Chunk {
    pub fn new(source_id: &SourceId, chunk_index: u32, page: Option<u32>, text: String) -> Self {
        let char_len = text.chars().count();
        Self {
            id: ChunkId::new(source_id, chunk_index),
            text,
            meta: ChunkMeta {
                source_id: source_id.clone(),
                chunk_index,
                page,
                char_len,
                ingested_at: Some(Utc::now()),
            },
        }
    }

    /// Append `other`'s text to this chunk, separated by a space.
    pub fn absorb(&mut self, other: &Chunk) {
        self.text = format!("{} {}", self.text, other.text).trim().to_string();
        self.meta.char_len = self.text.chars().count();
    }

    /// The reference this chunk contributes to an answer.
    pub fn source_ref(&self) -> SourceRef {
        SourceRef {
            chunk_id: Some(self.id.clone()),
            source_id: Some(self.meta.source_id.clone()),
            chunk_index: Some(self.meta.chunk_index),
            page: self.meta.page,
        }
    }
}

// ── Retrieval ─────────────────────────────────────────────────────

/// A single retrieval result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Hit {
    pub text: Option<String>,
    pub source_id: Option<SourceId>,
    pub chunk_index: Option<u32>,
    pub page: Option<u32>,
    pub chunk_id: Option<ChunkId>,
    /// `1 - distance` for vector hits, keyword score for fallback hits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Hit {
    pub fn from_chunk(chunk: &Chunk, score: f64) -> Self {
        Self {
            text: Some(chunk.text.clone()),
            source_id: Some(chunk.meta.source_id.clone()),
            chunk_index: Some(chunk.meta.chunk_index),
            page: chunk.meta.page,
            chunk_id: Some(chunk.id.clone()),
            score: Some(score),
        }
    }

    pub fn source_ref(&self) -> SourceRef {
        SourceRef {
            chunk_id: self.chunk_id.clone(),
            source_id: self.source_id.clone(),
            chunk_index: self.chunk_index,
            page: self.page,
        }
    }
}

/// Where a piece of an answer came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    pub chunk_id: Option<ChunkId>,
    pub source_id: Option<SourceId>,
    pub chunk_index: Option<u32>,
    pub page: Option<u32>,
}

/// A composed answer with the hits it was built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

// ── Ingestion ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Ok,
    Error,
}

/// Outcome of one ingest request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestReport {
    pub status: IngestStatus,
    pub ingested_chunks: usize,
    pub source_id: Option<SourceId>,
}

impl IngestReport {
    pub fn ok(source_id: SourceId, ingested_chunks: usize) -> Self {
        Self {
            status: IngestStatus::Ok,
            ingested_chunks,
            source_id: Some(source_id),
        }
    }

    pub fn empty() -> Self {
        Self {
            status: IngestStatus::Error,
            ingested_chunks: 0,
            source_id: None,
        }
    }
}

/// Coarse file type used to pick a parser.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_format() {
        let source = SourceId::from("notes.txt");
        let id = ChunkId::new(&source, 3);
        let parts: Vec<&str> = id.as_str().split("::").collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "notes.txt");
        assert_eq!(parts[1], "chunk");
        assert_eq!(parts[2], "3");
        assert_eq!(parts[3].len(), 8);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_source_id_has_prefix() {
        let id = SourceId::generate("txt");
        assert!(id.as_str().starts_with("txt-"));
        assert_eq!(id.as_str().len(), "txt-".len() + 8);
    }

    #[test]
    fn chunk_char_len_counts_characters() {
        let chunk = Chunk::new(&SourceId::from("s"), 0, None, "héllo".to_string());
        assert_eq!(chunk.meta.char_len, 5);
    }

    #[test]
    fn chunk_loads_without_optional_meta() {
        let json = r#"{"id": "a::chunk::0::deadbeef", "text": "Hello.", "meta": {"source_id": "a", "chunk_index": 0}}"#;
        let chunk: Chunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.meta.source_id.as_str(), "a");
        assert_eq!(chunk.meta.page, None);
        assert_eq!(chunk.meta.ingested_at, None);
    }

    #[test]
    fn ingest_status_serializes_lowercase() {
        let json = serde_json::to_string(&IngestReport::empty()).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("\"ingested_chunks\":0"));
    }

    #[test]
    fn hit_omits_missing_score() {
        let hit = Hit {
            text: Some("t".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&hit).unwrap();
        assert!(!json.contains("score"));
    }
}
