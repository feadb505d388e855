//! The knowledge-graph handle every other module in this crate goes through.

use neo4rs::{query, ConfigBuilder, Graph, Query, Row, Txn};

use secondbrain_core::config::Neo4jConfig;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("{label} node {id} not found")]
    NotFound { label: String, id: String },

    #[error("Graph serialization error: {0}")]
    Serialization(String),
}

/// Connection settings, taken from the `neo4j` config section.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&Neo4jConfig::default())
    }
}

impl From<&Neo4jConfig> for GraphConfig {
    fn from(config: &Neo4jConfig) -> Self {
        Self {
            uri: config.uri.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            max_connections: config.max_connections.max(1),
        }
    }
}

/// Pooled client holding Source, Chunk and Concept nodes. Cloning shares the pool.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Build the pool and run `RETURN 1`, so a wrong address or bad
    /// credentials fail here rather than on the first ingest.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let settings = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(settings)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;
        let client = Self { graph };

        client
            .fetch_one(query("RETURN 1 AS ok"))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(
            uri = %config.uri,
            max_connections = config.max_connections,
            "Knowledge graph connected"
        );
        Ok(client)
    }

    pub async fn execute(&self, q: Query) -> Result<(), GraphError> {
        self.graph.run(q).await?;
        Ok(())
    }

    pub async fn fetch_all(&self, q: Query) -> Result<Vec<Row>, GraphError> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    pub async fn fetch_one(&self, q: Query) -> Result<Option<Row>, GraphError> {
        let mut stream = self.graph.execute(q).await?;
        Ok(stream.next().await?)
    }

    /// Batch upserts commit through this.
    pub async fn transaction(&self) -> Result<Txn, GraphError> {
        Ok(self.graph.start_txn().await?)
    }
}
