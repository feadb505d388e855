//! secondbrain-core: Shared types, configuration, and error handling for secondbrain.
//!
//! This crate provides the foundational types used across all secondbrain components:
//! - Chunk and source identifiers for ingested documents
//! - Retrieval hits and composed answers
//! - Configuration loading (YAML/TOML file + environment)
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use crate::config::BrainConfig;
pub use crate::error::BrainError;
pub use crate::types::{
    Answer, Chunk, ChunkId, ChunkMeta, FileKind, Hit, IngestReport, IngestStatus, SourceId,
    SourceRef,
};
