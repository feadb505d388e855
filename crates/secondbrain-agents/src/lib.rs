//! secondbrain-agents: the ingestion and question-answering pipeline.
//!
//! Each agent owns one step:
//! - [`ingest::IngestAgent`] turns text and files into sentence-aware chunks
//! - [`embedding::Embedder`] maps chunk text to vectors
//! - [`retriever::RetrieverAgent`] finds relevant chunks (vector search, then
//!   keyword fallback over the persisted chunk files)
//! - [`rag::RagAgent`] composes an answer with source references
//! - [`linking::LinkingAgent`] suggests links between chunks for the graph
//! - [`root::RootAgent`] orchestrates all of the above

pub mod embedding;
pub mod error;
pub mod ingest;
pub mod knowledge;
pub mod linking;
pub mod parsers;
pub mod rag;
pub mod retriever;
pub mod root;
pub mod store;

pub use error::AgentError;
pub use root::{IngestInput, RootAgent, SourceSummary};
