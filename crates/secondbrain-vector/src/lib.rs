//! secondbrain-vector: vector store access for chunk embeddings.
//!
//! [`WeaviateStore`] talks to Weaviate over its stable REST/GraphQL API rather
//! than a client library. [`MemoryVectorStore`] keeps everything in-process
//! and backs tests and single-node setups.

pub mod memory;
pub mod store;
pub mod weaviate;

pub use memory::{cosine_similarity, MemoryVectorStore};
pub use store::{VectorError, VectorRecord, VectorStore};
pub use weaviate::{WeaviateConfig, WeaviateStore};
