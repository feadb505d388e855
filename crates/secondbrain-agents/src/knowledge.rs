//! The graph writes the pipeline needs, behind a trait so ingestion can run
//! without Neo4j.

use async_trait::async_trait;

use secondbrain_graph::{GraphClient, GraphError, MemoryEdge, MemoryNode};

#[async_trait]
pub trait KnowledgeGraph: Send + Sync {
    async fn upsert_node(&self, node: &MemoryNode) -> Result<(), GraphError>;
    async fn create_edge(&self, edge: &MemoryEdge) -> Result<(), GraphError>;
}

#[async_trait]
impl KnowledgeGraph for GraphClient {
    async fn upsert_node(&self, node: &MemoryNode) -> Result<(), GraphError> {
        GraphClient::upsert_node(self, node).await
    }

    async fn create_edge(&self, edge: &MemoryEdge) -> Result<(), GraphError> {
        GraphClient::create_edge(self, edge).await
    }
}
