//! Orchestrates ingestion and question answering.

use std::sync::Arc;

use serde::Serialize;

use secondbrain_core::config::VectorBackend;
use secondbrain_core::{Answer, BrainConfig, Chunk, IngestReport, SourceId};
use secondbrain_graph::{EdgeRelation, GraphClient, GraphConfig, MemoryEdge, MemoryNode};
use secondbrain_vector::{MemoryVectorStore, VectorRecord, VectorStore, WeaviateStore};

use crate::embedding::{build_embedder, Embedder};
use crate::error::{AgentError, Result};
use crate::ingest::IngestAgent;
use crate::knowledge::KnowledgeGraph;
use crate::linking::{LinkNode, LinkingAgent};
use crate::rag::RagAgent;
use crate::retriever::RetrieverAgent;
use crate::store::ChunkStore;

/// What to ingest.
#[derive(Debug, Clone)]
pub enum IngestInput {
    Text { content: String },
    File { bytes: Vec<u8>, filename: String },
}

/// One row of the sources listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    pub source_id: SourceId,
    pub chunks: usize,
}

pub struct RootAgent {
    ingest: IngestAgent,
    embedder: Arc<dyn Embedder>,
    vectors: Arc<dyn VectorStore>,
    store: ChunkStore,
    retriever: RetrieverAgent,
    rag: RagAgent,
    linking: LinkingAgent,
    graph: Option<Arc<dyn KnowledgeGraph>>,
    default_top_k: usize,
}

impl RootAgent {
    /// Wire up every component from configuration. An unreachable Neo4j
    /// disables graph writes instead of failing startup.
    pub async fn from_config(config: &BrainConfig) -> Result<Self> {
        let embedder = build_embedder(&config.embedding)?;

        let vectors: Arc<dyn VectorStore> = match config.vector.backend {
            VectorBackend::Weaviate => Arc::new(WeaviateStore::new(&config.weaviate)?),
            VectorBackend::Memory => Arc::new(MemoryVectorStore::new(config.weaviate.distance)),
        };

        let store = ChunkStore::open(&config.data_dir)?;

        let graph: Option<Arc<dyn KnowledgeGraph>> = if config.neo4j.enabled {
            match GraphClient::connect(&GraphConfig::from(&config.neo4j)).await {
                Ok(client) => {
                    if let Err(e) = client.ensure_constraints().await {
                        tracing::warn!(error = %e, "Could not ensure graph constraints");
                    }
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::warn!(error = %e, uri = %config.neo4j.uri, "Neo4j unavailable, graph writes disabled");
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(
            data_dir = %config.data_dir,
            vector_backend = ?config.vector.backend,
            embedding = ?config.embedding.provider,
            graph = graph.is_some(),
            "Root agent ready"
        );

        Ok(Self::new(config, embedder, vectors, store, graph))
    }

    /// Assemble from already-built components.
    pub fn new(
        config: &BrainConfig,
        embedder: Arc<dyn Embedder>,
        vectors: Arc<dyn VectorStore>,
        store: ChunkStore,
        graph: Option<Arc<dyn KnowledgeGraph>>,
    ) -> Self {
        Self {
            ingest: IngestAgent::new(
                config.chunking.chunk_size_chars,
                config.chunking.min_chunk_chars,
            ),
            retriever: RetrieverAgent::new(embedder.clone(), vectors.clone(), store.clone()),
            rag: RagAgent::new(config.retrieval.max_context_chars),
            linking: LinkingAgent::new(config.linking.threshold, config.linking.max_links_per_node),
            embedder,
            vectors,
            store,
            graph,
            default_top_k: config.retrieval.top_k,
        }
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Chunk, embed, index, persist, and (when attached) mirror into the graph.
    pub async fn handle_ingest(&self, input: IngestInput) -> Result<IngestReport> {
        let chunks = match input {
            IngestInput::Text { content } => self.ingest.process_text(&content, None),
            IngestInput::File { bytes, filename } => {
                let ingest = self.ingest.clone();
                tokio::task::spawn_blocking(move || ingest.process_file_bytes(&bytes, &filename))
                    .await
                    .map_err(|e| AgentError::Parse {
                        kind: "file".to_string(),
                        reason: e.to_string(),
                    })??
            }
        };

        let Some(first) = chunks.first() else {
            tracing::warn!("Ingest produced no chunks");
            return Ok(IngestReport::empty());
        };
        let source_id = first.meta.source_id.clone();

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_texts(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(AgentError::Embedding(format!(
                "expected {} vectors, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        for (chunk, vector) in chunks.iter().zip(&embeddings) {
            self.vectors
                .upsert(&VectorRecord::from_chunk(chunk, vector.clone()))
                .await?;
        }

        self.store.save(&source_id, &chunks)?;

        if let Some(graph) = &self.graph {
            if let Err(e) = self.write_graph(graph.as_ref(), &source_id, &chunks, &embeddings).await {
                tracing::warn!(source_id = %source_id, error = %e, "Graph write failed");
            }
        }

        tracing::info!(source_id = %source_id, chunks = chunks.len(), "Source ingested");
        Ok(IngestReport::ok(source_id, chunks.len()))
    }

    async fn write_graph(
        &self,
        graph: &dyn KnowledgeGraph,
        source_id: &SourceId,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        graph
            .upsert_node(&MemoryNode::source(source_id, chunks.len()))
            .await?;

        for chunk in chunks {
            graph.upsert_node(&MemoryNode::chunk(chunk)).await?;
            graph
                .create_edge(&MemoryEdge::new(
                    source_id.as_str(),
                    chunk.id.as_str(),
                    EdgeRelation::HasChunk,
                ))
                .await?;
        }

        for pair in chunks.windows(2) {
            graph
                .create_edge(&MemoryEdge::new(
                    pair[0].id.as_str(),
                    pair[1].id.as_str(),
                    EdgeRelation::Next,
                ))
                .await?;
        }

        let nodes: Vec<LinkNode<'_>> = chunks
            .iter()
            .zip(embeddings)
            .map(|(c, v)| LinkNode {
                id: c.id.as_str(),
                vector: v,
            })
            .collect();
        let links = self.linking.find_links(&nodes);
        for link in &links {
            graph
                .create_edge(
                    &MemoryEdge::new(link.source.as_str(), link.target.as_str(), link.relation)
                        .with_score(f64::from(link.score)),
                )
                .await?;
        }

        tracing::debug!(
            source_id = %source_id,
            chunks = chunks.len(),
            links = links.len(),
            "Graph updated"
        );
        Ok(())
    }

    /// Retrieve, then compose. `top_k` defaults to the configured value.
    pub async fn handle_query(&self, query: &str, top_k: Option<usize>) -> Result<Answer> {
        let top_k = top_k.unwrap_or(self.default_top_k);
        let hits = self.retriever.retrieve(query, top_k).await?;
        let answer = self.rag.generate_answer(query, &hits);

        tracing::info!(top_k, hits = hits.len(), "Query answered");
        Ok(answer)
    }

    pub fn list_sources(&self) -> Result<Vec<SourceSummary>> {
        Ok(self
            .store
            .list_sources()?
            .into_iter()
            .map(|(source_id, chunks)| SourceSummary { source_id, chunks })
            .collect())
    }

    pub fn source_chunks(&self, source_id: &SourceId) -> Result<Vec<Chunk>> {
        self.store.load(source_id)
    }
}
