//! Retrieval: vector search first, local keyword search when that finds nothing.
//!
//! The fallback keeps queries useful while the embedder is the non-semantic
//! hash embedder, and when the vector store is down.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use secondbrain_core::Hit;
use secondbrain_vector::VectorStore;

use crate::embedding::Embedder;
use crate::error::Result;
use crate::store::ChunkStore;

fn word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("word regex is valid"))
}

pub struct RetrieverAgent {
    embedder: Arc<dyn Embedder>,
    vectors: Arc<dyn VectorStore>,
    store: ChunkStore,
}

impl RetrieverAgent {
    pub fn new(embedder: Arc<dyn Embedder>, vectors: Arc<dyn VectorStore>, store: ChunkStore) -> Self {
        Self {
            embedder,
            vectors,
            store,
        }
    }

    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Hit>> {
        let qvec = self.embedder.embed_one(query).await?;

        let hits = match self.vectors.search(&qvec, top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "Vector search failed, using keyword fallback");
                Vec::new()
            }
        };

        if !hits.is_empty() {
            tracing::debug!(hits = hits.len(), "Vector search hits");
            return Ok(hits);
        }

        let hits = self.local_text_search(query, top_k)?;
        tracing::debug!(hits = hits.len(), "Keyword fallback hits");
        Ok(hits)
    }

    /// Score persisted chunks by occurrences of the whole query (weight 10)
    /// plus occurrences of each query word. Case-insensitive.
    pub fn local_text_search(&self, query: &str, top_k: usize) -> Result<Vec<Hit>> {
        let q = query.trim().to_lowercase();
        if q.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        let terms: Vec<&str> = word().find_iter(&q).map(|m| m.as_str()).collect();

        let mut scored: Vec<(usize, usize, Hit)> = Vec::new();
        for (seen, chunk) in self.store.load_all()?.into_iter().enumerate() {
            if chunk.text.is_empty() {
                continue;
            }
            let text = chunk.text.to_lowercase();
            let score = 10 * text.matches(q.as_str()).count()
                + terms.iter().map(|t| text.matches(t).count()).sum::<usize>();
            if score == 0 {
                continue;
            }
            scored.push((score, seen, Hit::from_chunk(&chunk, score as f64)));
        }

        // Among equal scores the chunk seen last ranks first.
        scored.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        scored.truncate(top_k);
        Ok(scored.into_iter().map(|(_, _, hit)| hit).collect())
    }
}
