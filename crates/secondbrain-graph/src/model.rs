//! Node and edge shapes written to the knowledge graph.

use serde::{Deserialize, Serialize};

use secondbrain_core::{Chunk, SourceId};

/// Neo4j label of a memory node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeLabel {
    /// An ingested document.
    Source,
    /// One chunk of a source.
    Chunk,
    /// A named idea that chunks can be linked to.
    Concept,
}

impl NodeLabel {
    pub fn as_cypher(&self) -> &'static str {
        match self {
            NodeLabel::Source => "Source",
            NodeLabel::Chunk => "Chunk",
            NodeLabel::Concept => "Concept",
        }
    }

    pub const ALL: [NodeLabel; 3] = [NodeLabel::Source, NodeLabel::Chunk, NodeLabel::Concept];
}

/// A node identified by `(label, id)` with free-form properties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryNode {
    pub id: String,
    pub label: NodeLabel,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl MemoryNode {
    pub fn new(label: NodeLabel, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label,
            properties: serde_json::Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn source(source_id: &SourceId, chunk_count: usize) -> Self {
        Self::new(NodeLabel::Source, source_id.as_str())
            .with("name", source_id.as_str())
            .with("chunk_count", chunk_count as u64)
    }

    pub fn chunk(chunk: &Chunk) -> Self {
        let node = Self::new(NodeLabel::Chunk, chunk.id.as_str())
            .with("text", chunk.text.as_str())
            .with("source_id", chunk.meta.source_id.as_str())
            .with("chunk_index", chunk.meta.chunk_index)
            .with("char_len", chunk.meta.char_len as u64);
        match chunk.meta.page {
            Some(page) => node.with("page", page),
            None => node,
        }
    }
}

/// Relationship types between memory nodes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeRelation {
    /// Source → Chunk.
    HasChunk,
    /// Chunk → following chunk of the same source.
    Next,
    /// Suggested semantic link between chunks.
    RelatedTo,
}

impl EdgeRelation {
    pub fn as_cypher(&self) -> &'static str {
        match self {
            EdgeRelation::HasChunk => "HAS_CHUNK",
            EdgeRelation::Next => "NEXT",
            EdgeRelation::RelatedTo => "RELATED_TO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HAS_CHUNK" => Some(EdgeRelation::HasChunk),
            "NEXT" => Some(EdgeRelation::Next),
            "RELATED_TO" => Some(EdgeRelation::RelatedTo),
            _ => None,
        }
    }
}

/// A directed relationship between two existing nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryEdge {
    pub source_id: String,
    pub target_id: String,
    pub relation: EdgeRelation,
    /// Confidence for suggested links; 1.0 for structural edges.
    pub score: f64,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl MemoryEdge {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation: EdgeRelation,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation,
            score: 1.0,
            properties: serde_json::Map::new(),
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}
