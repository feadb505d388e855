//! In-process vector store using brute-force cosine distance.

use async_trait::async_trait;
use tokio::sync::RwLock;

use secondbrain_core::Hit;

use crate::store::{Result, VectorError, VectorRecord, VectorStore};

/// Vector store held entirely in memory.
///
/// Search mirrors the Weaviate setup: cosine distance (`1 - similarity`),
/// hits beyond `max_distance` are dropped.
pub struct MemoryVectorStore {
    records: RwLock<Vec<VectorRecord>>,
    max_distance: f32,
}

impl MemoryVectorStore {
    pub fn new(max_distance: f32) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            max_distance,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new(0.8)
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, record: &VectorRecord) -> Result<()> {
        let mut records = self.records.write().await;

        if let Some(first) = records.first() {
            if first.vector.len() != record.vector.len() {
                return Err(VectorError::Dimension {
                    expected: first.vector.len(),
                    actual: record.vector.len(),
                });
            }
        }

        match records.iter_mut().find(|r| r.chunk_id == record.chunk_id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Hit>> {
        let records = self.records.read().await;

        let mut scored: Vec<(f32, &VectorRecord)> = records
            .iter()
            .filter(|r| r.vector.len() == vector.len())
            .map(|r| (1.0 - cosine_similarity(vector, &r.vector), r))
            .filter(|(distance, _)| *distance <= self.max_distance)
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(distance, r)| Hit {
                text: Some(r.text.clone()),
                source_id: Some(r.source_id.clone()),
                chunk_index: Some(r.chunk_index),
                page: r.page,
                chunk_id: Some(r.chunk_id.clone()),
                score: Some(f64::from(1.0 - distance)),
            })
            .collect())
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 if either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secondbrain_core::{ChunkId, SourceId};

    fn record(id: &str, vector: Vec<f32>) -> VectorRecord {
        VectorRecord {
            chunk_id: ChunkId(id.to_string()),
            vector,
            text: format!("text of {id}"),
            source_id: SourceId::from("notes.txt"),
            chunk_index: 0,
            page: None,
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn search_orders_by_distance() {
        let store = MemoryVectorStore::new(1.0);
        store.upsert(&record("far", vec![0.0, 1.0])).await.unwrap();
        store.upsert(&record("near", vec![1.0, 0.1])).await.unwrap();

        let hits = store.search(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id.as_ref().unwrap().as_str(), "near");
        assert!(hits[0].score.unwrap() > hits[1].score.unwrap());
    }

    #[tokio::test]
    async fn search_drops_hits_beyond_max_distance() {
        let store = MemoryVectorStore::new(0.5);
        store.upsert(&record("same", vec![1.0, 0.0])).await.unwrap();
        store.upsert(&record("orthogonal", vec![0.0, 1.0])).await.unwrap();

        let hits = store.search(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id.as_ref().unwrap().as_str(), "same");
    }

    #[tokio::test]
    async fn search_respects_top_k() {
        let store = MemoryVectorStore::new(1.0);
        for i in 0..4 {
            store
                .upsert(&record(&format!("c{i}"), vec![1.0, i as f32 * 0.1]))
                .await
                .unwrap();
        }
        assert_eq!(store.search(&[1.0, 0.0], 2).await.unwrap().len(), 2);
        assert!(store.search(&[1.0, 0.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_record() {
        let store = MemoryVectorStore::default();
        store.upsert(&record("a", vec![1.0, 0.0])).await.unwrap();
        let mut updated = record("a", vec![1.0, 0.0]);
        updated.text = "rewritten".to_string();
        store.upsert(&updated).await.unwrap();

        assert_eq!(store.len().await, 1);
        let hits = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].text.as_deref(), Some("rewritten"));
    }

    #[tokio::test]
    async fn upsert_rejects_dimension_mismatch() {
        let store = MemoryVectorStore::default();
        store.upsert(&record("a", vec![1.0, 0.0])).await.unwrap();
        let err = store
            .upsert(&record("b", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VectorError::Dimension {
                expected: 2,
                actual: 3
            }
        ));
    }
}
