//! Write operations for the knowledge graph.
//!
//! All mutations use MERGE (upsert) semantics so re-ingesting a source is
//! idempotent. Nodes are identified by `(label, id)`.

use chrono::Utc;
use neo4rs::{query, Query};

use secondbrain_core::SourceId;

use crate::client::{GraphClient, GraphError};
use crate::model::{MemoryEdge, MemoryNode, NodeLabel};

impl GraphClient {
    /// Create the per-label uniqueness constraints on `id`.
    pub async fn ensure_constraints(&self) -> Result<(), GraphError> {
        for label in NodeLabel::ALL {
            let name = label.as_cypher().to_lowercase();
            let cypher = format!(
                "CREATE CONSTRAINT {name}_id IF NOT EXISTS
                 FOR (n:{label}) REQUIRE n.id IS UNIQUE",
                label = label.as_cypher()
            );
            self.execute(query(&cypher)).await?;
        }
        tracing::debug!("Graph constraints ensured");
        Ok(())
    }

    /// Upsert a node; properties are merged into any existing ones.
    pub async fn upsert_node(&self, node: &MemoryNode) -> Result<(), GraphError> {
        self.execute(node_upsert_query(node)?).await
    }

    /// Upsert multiple nodes in a single transaction.
    pub async fn upsert_nodes(&self, nodes: &[MemoryNode]) -> Result<(), GraphError> {
        let mut txn = self.transaction().await?;
        for node in nodes {
            txn.run(node_upsert_query(node)?).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    /// Create (or refresh) a relationship between two existing nodes.
    pub async fn create_edge(&self, edge: &MemoryEdge) -> Result<(), GraphError> {
        let rel_type = edge.relation.as_cypher();
        let props_json = serde_json::to_string(&edge.properties)
            .map_err(|e| GraphError::Serialization(e.to_string()))?;

        let cypher = format!(
            "MATCH (a {{id: $source_id}})
             MATCH (b {{id: $target_id}})
             MERGE (a)-[r:{rel_type}]->(b)
             ON CREATE SET r.first_seen = $now
             SET r += apoc.convert.fromJsonMap($props)
             SET r.score = $score, r.last_seen = $now
             RETURN count(r) AS cnt"
        );

        let q = query(&cypher)
            .param("source_id", edge.source_id.clone())
            .param("target_id", edge.target_id.clone())
            .param("props", props_json)
            .param("score", edge.score)
            .param("now", Utc::now().to_rfc3339());

        let created = match self.fetch_one(q).await? {
            Some(row) => row.get::<i64>("cnt").unwrap_or(0),
            None => 0,
        };

        if created == 0 {
            return Err(GraphError::NotFound {
                label: "endpoint".to_string(),
                id: format!("{} -> {}", edge.source_id, edge.target_id),
            });
        }
        Ok(())
    }

    /// Delete a source node and all of its chunks.
    /// Returns the count of deleted chunks.
    pub async fn delete_source(&self, source_id: &SourceId) -> Result<i64, GraphError> {
        let q = query(
            "MATCH (s:Source {id: $id})
             OPTIONAL MATCH (s)-[:HAS_CHUNK]->(c:Chunk)
             WITH s, collect(c) AS chunks, count(c) AS cnt
             FOREACH (x IN chunks | DETACH DELETE x)
             DETACH DELETE s
             RETURN cnt",
        )
        .param("id", source_id.as_str().to_string());

        let deleted = match self.fetch_one(q).await? {
            Some(row) => row.get::<i64>("cnt").unwrap_or(0),
            None => 0,
        };
        tracing::info!(source_id = %source_id, deleted_chunks = deleted, "Source removed from graph");
        Ok(deleted)
    }
}

fn node_upsert_query(node: &MemoryNode) -> Result<Query, GraphError> {
    let label = node.label.as_cypher();
    let props_json = serde_json::to_string(&node.properties)
        .map_err(|e| GraphError::Serialization(e.to_string()))?;

    let cypher = format!(
        "MERGE (n:{label} {{id: $id}})
         ON CREATE SET n.first_seen = $now
         SET n += apoc.convert.fromJsonMap($props)
         SET n.last_seen = $now"
    );

    Ok(query(&cypher)
        .param("id", node.id.clone())
        .param("props", props_json)
        .param("now", Utc::now().to_rfc3339()))
}
