//! secondbrain-graph: Neo4j client for the memory knowledge graph.
//!
//! Sources, their chunks, and suggested links between chunks are mirrored
//! into Neo4j. All graph reads and writes go through [`GraphClient`].

pub mod client;
pub mod model;
pub mod mutations;
pub mod queries;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use model::{EdgeRelation, MemoryEdge, MemoryNode, NodeLabel};
pub use queries::{Neighbor, NodeRecord};
