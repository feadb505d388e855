//! Read operations for the knowledge graph.

use neo4rs::query;

use secondbrain_core::SourceId;

use crate::client::{GraphClient, GraphError};
use crate::model::NodeLabel;

/// A lightweight record returned from node queries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    pub properties: serde_json::Value,
}

/// A neighbor result: node + the connecting relationship.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Neighbor {
    pub node: NodeRecord,
    pub relation: String,
    pub score: Option<f64>,
}

impl GraphClient {
    /// Run an arbitrary read query with string parameters and collect its rows.
    pub async fn query(
        &self,
        cypher: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<neo4rs::Row>, GraphError> {
        let q = params
            .iter()
            .fold(query(cypher), |q, (key, value)| q.param(key, value.clone()));
        self.fetch_all(q).await
    }

    /// Get a node by label and id.
    pub async fn get_node(&self, label: NodeLabel, id: &str) -> Result<NodeRecord, GraphError> {
        let label = label.as_cypher();
        let cypher = format!("MATCH (n:{label} {{id: $id}}) RETURN n");
        let q = query(&cypher).param("id", id.to_string());

        match self.fetch_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("n").map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize node: {e}"))
                })?;
                Ok(neo4j_node_to_record(&node, label))
            }
            None => Err(GraphError::NotFound {
                label: label.to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// Count nodes with a given label.
    pub async fn count_nodes(&self, label: NodeLabel) -> Result<i64, GraphError> {
        let cypher = format!("MATCH (n:{}) RETURN count(n) AS cnt", label.as_cypher());
        match self.fetch_one(query(&cypher)).await? {
            Some(row) => Ok(row.get::<i64>("cnt").unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// All chunks of a source, in chunk order.
    pub async fn chunks_for_source(
        &self,
        source_id: &SourceId,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        let q = query(
            "MATCH (:Source {id: $id})-[:HAS_CHUNK]->(c:Chunk)
             RETURN c
             ORDER BY c.chunk_index ASC",
        )
        .param("id", source_id.as_str().to_string());

        let rows = self.fetch_all(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("c").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize chunk: {e}"))
            })?;
            results.push(neo4j_node_to_record(&node, NodeLabel::Chunk.as_cypher()));
        }
        Ok(results)
    }

    /// Neighbors of a node in either direction, strongest links first.
    pub async fn neighbors(&self, id: &str, limit: u32) -> Result<Vec<Neighbor>, GraphError> {
        let q = query(
            "MATCH (a {id: $id})-[r]-(b)
             RETURN b, type(r) AS rel_type, r.score AS score, labels(b) AS labels
             ORDER BY coalesce(r.score, 0.0) DESC
             LIMIT $limit",
        )
        .param("id", id.to_string())
        .param("limit", limit as i64);

        let rows = self.fetch_all(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let neo_node: neo4rs::Node = row.get("b").map_err(|e| {
                GraphError::Serialization(format!("Failed to get neighbor node: {e}"))
            })?;
            let labels: Vec<String> = row.get("labels").unwrap_or_default();
            let label = labels.first().cloned().unwrap_or_default();

            results.push(Neighbor {
                node: neo4j_node_to_record(&neo_node, &label),
                relation: row.get("rel_type").unwrap_or_default(),
                score: row.get::<f64>("score").ok(),
            });
        }
        Ok(results)
    }
}

/// Convert a neo4rs::Node to our lightweight NodeRecord.
fn neo4j_node_to_record(node: &neo4rs::Node, label: &str) -> NodeRecord {
    let id: String = node.get("id").unwrap_or_default();

    let mut props = serde_json::Map::new();
    for key in &["name", "text", "source_id", "first_seen", "last_seen"] {
        if let Ok(v) = node.get::<String>(key) {
            props.insert((*key).to_string(), serde_json::Value::String(v));
        }
    }
    for key in &["chunk_index", "page", "char_len", "chunk_count"] {
        if let Ok(v) = node.get::<i64>(key) {
            props.insert((*key).to_string(), serde_json::Value::from(v));
        }
    }

    NodeRecord {
        id,
        label: label.to_string(),
        properties: serde_json::Value::Object(props),
    }
}
