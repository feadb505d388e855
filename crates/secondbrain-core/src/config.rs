//! Configuration management for secondbrain services.
//!
//! Configuration is loaded from (in priority order):
//! 1. `WEAVIATE_URL` (overrides `weaviate.url` only)
//! 2. Environment variables (`SECOND_BRAIN_` prefix, `__` between sections,
//!    e.g. `SECOND_BRAIN_DATA_DIR`, `SECOND_BRAIN_WEAVIATE__URL`)
//! 3. Config file (`adk_config.yaml` by default; any format the `config` crate detects)
//! 4. Defaults

use std::collections::HashMap;

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_CONFIG_PREFIX: &str = "adk_config";
const ENV_PREFIX: &str = "SECOND_BRAIN";
const LEGACY_WEAVIATE_URL: &str = "WEAVIATE_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BrainConfig {
    /// Directory holding one JSON chunk file per source.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub vector: VectorConfig,

    #[serde(default)]
    pub weaviate: WeaviateConfig,

    #[serde(default)]
    pub neo4j: Neo4jConfig,

    #[serde(default)]
    pub linking: LinkingConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    /// Approximate max characters per chunk (not tokens).
    #[serde(default = "default_chunk_size")]
    pub chunk_size_chars: usize,

    /// Chunks shorter than this are merged into their successor when it fits.
    #[serde(default = "default_min_chunk")]
    pub min_chunk_chars: usize,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic MD5-derived vectors. Not semantic.
    #[default]
    Hash,
    /// Any OpenAI-compatible `/embeddings` endpoint.
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,

    #[serde(default = "default_dim")]
    pub dim: usize,

    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Budget for the context the answer composer reads.
    #[serde(default = "default_max_context")]
    pub max_context_chars: usize,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    #[default]
    Weaviate,
    /// In-process store; contents are lost on restart.
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VectorConfig {
    #[serde(default)]
    pub backend: VectorBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeaviateConfig {
    #[serde(default = "default_weaviate_url")]
    pub url: String,

    #[serde(default = "default_class_name")]
    pub class_name: String,

    /// Maximum `nearVector` distance for a search hit.
    #[serde(default = "default_distance")]
    pub distance: f32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jConfig {
    /// Mirror ingested sources into the knowledge graph.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_neo4j_uri")]
    pub uri: String,

    #[serde(default = "default_neo4j_user")]
    pub user: String,

    #[serde(default = "default_neo4j_password")]
    pub password: String,

    /// Bolt connection pool size.
    #[serde(default = "default_neo4j_max_connections")]
    pub max_connections: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkingConfig {
    /// Minimum cosine similarity for a suggested link.
    #[serde(default = "default_link_threshold")]
    pub threshold: f32,

    #[serde(default = "default_max_links")]
    pub max_links_per_node: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl BrainConfig {
    /// Load configuration from `{file_prefix}.*`, the process environment,
    /// and defaults.
    pub fn load(file_prefix: &str) -> Result<Self> {
        Self::load_with_env(
            file_prefix,
            None,
            std::env::var(LEGACY_WEAVIATE_URL).ok(),
        )
    }

    /// Load with an explicit environment map instead of the process environment.
    pub fn load_with_env(
        file_prefix: &str,
        env: Option<HashMap<String, String>>,
        weaviate_url: Option<String>,
    ) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::with_name(file_prefix).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("weaviate.url", weaviate_url)?
            .build()?;

        let mut config: BrainConfig = cfg.try_deserialize()?;
        config.weaviate.url = config.weaviate.url.trim_end_matches('/').to_string();

        tracing::debug!(
            file_prefix,
            data_dir = %config.data_dir,
            vector_backend = ?config.vector.backend,
            "Configuration loaded"
        );
        Ok(config)
    }
}

fn default_data_dir() -> String {
    "data/chunks".to_string()
}

fn default_chunk_size() -> usize {
    800
}

fn default_min_chunk() -> usize {
    200
}

fn default_dim() -> usize {
    128
}

fn default_embedding_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_top_k() -> usize {
    5
}

fn default_max_context() -> usize {
    2000
}

fn default_weaviate_url() -> String {
    "http://weaviate:8080".to_string()
}

fn default_class_name() -> String {
    "Chunk".to_string()
}

fn default_distance() -> f32 {
    0.8
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "secondbrain-dev".to_string()
}

fn default_neo4j_max_connections() -> usize {
    8
}

fn default_link_threshold() -> f32 {
    0.9
}

fn default_max_links() -> usize {
    3
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            vector: VectorConfig::default(),
            weaviate: WeaviateConfig::default(),
            neo4j: Neo4jConfig::default(),
            linking: LinkingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size_chars: default_chunk_size(),
            min_chunk_chars: default_min_chunk(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            dim: default_dim(),
            endpoint: default_embedding_endpoint(),
            model: default_embedding_model(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_context_chars: default_max_context(),
        }
    }
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            url: default_weaviate_url(),
            class_name: default_class_name(),
            distance: default_distance(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
            max_connections: default_neo4j_max_connections(),
        }
    }
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            threshold: default_link_threshold(),
            max_links_per_node: default_max_links(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
