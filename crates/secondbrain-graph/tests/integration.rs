//! Integration tests for secondbrain-graph against a live Neo4j instance
//! (with the APOC plugin, as in docker-compose.yml).
//!
//! Run with: cargo test --package secondbrain-graph --test integration -- --ignored
//!
//! Skipped automatically if Neo4j is not available.

use secondbrain_core::{Chunk, SourceId};
use secondbrain_graph::{EdgeRelation, GraphClient, GraphConfig, MemoryEdge, MemoryNode, NodeLabel};

async fn connect_or_skip() -> Option<GraphClient> {
    let config = GraphConfig::default();
    match GraphClient::connect(&config).await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test (Neo4j not available): {e}");
            None
        }
    }
}

fn unique_source() -> SourceId {
    SourceId(format!("test-{}.txt", uuid::Uuid::new_v4()))
}

async fn cleanup(client: &GraphClient, source_id: &SourceId) {
    let _ = client.delete_source(source_id).await;
}

async fn seed_source(client: &GraphClient, source_id: &SourceId, texts: &[&str]) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| Chunk::new(source_id, i as u32, None, t.to_string()))
        .collect();

    client
        .upsert_node(&MemoryNode::source(source_id, chunks.len()))
        .await
        .unwrap();
    for chunk in &chunks {
        client.upsert_node(&MemoryNode::chunk(chunk)).await.unwrap();
        client
            .create_edge(&MemoryEdge::new(
                source_id.as_str(),
                chunk.id.as_str(),
                EdgeRelation::HasChunk,
            ))
            .await
            .unwrap();
    }
    chunks
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_upsert_and_get_source() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let source = unique_source();

    client
        .upsert_node(&MemoryNode::source(&source, 0))
        .await
        .unwrap();

    let record = client.get_node(NodeLabel::Source, source.as_str()).await.unwrap();
    assert_eq!(record.id, source.as_str());
    assert_eq!(record.label, "Source");
    assert_eq!(
        record.properties.get("name").and_then(|v| v.as_str()),
        Some(source.as_str())
    );

    cleanup(&client, &source).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_upsert_node_is_idempotent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let source = unique_source();
    let before = client.count_nodes(NodeLabel::Source).await.unwrap();

    let node = MemoryNode::source(&source, 1);
    client.upsert_node(&node).await.unwrap();
    client.upsert_node(&node).await.unwrap();

    let after = client.count_nodes(NodeLabel::Source).await.unwrap();
    assert_eq!(after, before + 1);

    cleanup(&client, &source).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_chunks_for_source_in_order() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let source = unique_source();
    seed_source(&client, &source, &["First.", "Second.", "Third."]).await;

    let chunks = client.chunks_for_source(&source).await.unwrap();
    let texts: Vec<&str> = chunks
        .iter()
        .filter_map(|c| c.properties.get("text").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(texts, vec!["First.", "Second.", "Third."]);

    cleanup(&client, &source).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_related_link_and_neighbors() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let source = unique_source();
    let chunks = seed_source(&client, &source, &["Rust ownership.", "Borrow checker."]).await;

    client
        .create_edge(
            &MemoryEdge::new(
                chunks[0].id.as_str(),
                chunks[1].id.as_str(),
                EdgeRelation::RelatedTo,
            )
            .with_score(0.93),
        )
        .await
        .unwrap();

    let neighbors = client.neighbors(chunks[0].id.as_str(), 10).await.unwrap();
    let related = neighbors
        .iter()
        .find(|n| n.relation == "RELATED_TO")
        .expect("RELATED_TO neighbor");
    assert_eq!(related.node.id, chunks[1].id.as_str());
    assert!((related.score.unwrap() - 0.93).abs() < 1e-9);

    cleanup(&client, &source).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_edge_to_missing_node_fails() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let edge = MemoryEdge::new("missing-a", "missing-b", EdgeRelation::Next);
    assert!(client.create_edge(&edge).await.is_err());
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_delete_source_removes_chunks() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let source = unique_source();
    seed_source(&client, &source, &["One.", "Two."]).await;

    let deleted = client.delete_source(&source).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(client.chunks_for_source(&source).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_raw_query_with_params() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let source = unique_source();
    seed_source(&client, &source, &["Alpha.", "Beta."]).await;

    let rows = client
        .query(
            "MATCH (:Source {id: $id})-[:HAS_CHUNK]->(c:Chunk) RETURN count(c) AS cnt",
            &[("id", source.to_string())],
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get::<i64>("cnt").unwrap(), 2);

    cleanup(&client, &source).await;
}
