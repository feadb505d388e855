//! Error types for the secondbrain-agents crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to parse {kind} input: {reason}")]
    Parse { kind: String, reason: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    Vector(#[from] secondbrain_vector::VectorError),

    #[error("Graph error: {0}")]
    Graph(#[from] secondbrain_graph::GraphError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
