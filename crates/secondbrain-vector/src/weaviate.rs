//! Weaviate access over plain HTTP.
//!
//! Uses the stable REST endpoints (`/v1/objects`, `/v1/schema`) and GraphQL
//! (`/v1/graphql`) for `nearVector` search, so no client library version has
//! to match the server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use uuid::Uuid;

use secondbrain_core::{ChunkId, Hit, SourceId};

pub use secondbrain_core::config::WeaviateConfig;

use crate::store::{Result, VectorError, VectorRecord, VectorStore};

/// Weaviate-backed vector store. Chunks live in a single class whose
/// vectors are supplied by the caller (`vectorizer: none`).
pub struct WeaviateStore {
    client: Client,
    base: String,
    class_name: String,
    distance: f32,
    schema_ready: OnceCell<()>,
}

impl WeaviateStore {
    pub fn new(config: &WeaviateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base = config.url.trim_end_matches('/').to_string();
        tracing::info!(url = %base, class = %config.class_name, "Weaviate store initialized");

        Ok(Self {
            client,
            base,
            class_name: config.class_name.clone(),
            distance: config.distance,
            schema_ready: OnceCell::new(),
        })
    }

    fn objects_endpoint(&self) -> String {
        format!("{}/v1/objects", self.base)
    }

    fn schema_endpoint(&self) -> String {
        format!("{}/v1/schema", self.base)
    }

    fn graphql_endpoint(&self) -> String {
        format!("{}/v1/graphql", self.base)
    }

    /// Whether Weaviate reports itself ready.
    pub async fn health(&self) -> Result<bool> {
        let resp = self
            .client
            .get(format!("{}/v1/.well-known/ready", self.base))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Make sure the chunk class exists. Failures are logged and retried on
    /// the next call; Weaviate's auto-schema may still accept the objects.
    async fn ensure_schema(&self) {
        let result = self
            .schema_ready
            .get_or_try_init(|| self.create_schema_if_missing())
            .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, class = %self.class_name, "Schema check failed, proceeding");
        }
    }

    async fn create_schema_if_missing(&self) -> Result<()> {
        let resp = self.client.get(self.schema_endpoint()).send().await?;
        if resp.status() == StatusCode::OK {
            let schema: Value = resp
                .json()
                .await
                .map_err(|e| VectorError::Serialization(e.to_string()))?;
            if schema_has_class(&schema, &self.class_name) {
                tracing::debug!(class = %self.class_name, "Schema already exists");
                return Ok(());
            }
        }

        let resp = self
            .client
            .post(self.schema_endpoint())
            .json(&class_schema(&self.class_name))
            .send()
            .await?;

        if resp.status().is_success() {
            tracing::info!(class = %self.class_name, "Created schema");
            Ok(())
        } else {
            Err(status_error(resp).await)
        }
    }
}

#[async_trait]
impl VectorStore for WeaviateStore {
    /// POST the object; on 409 with a UUID id, PUT over the existing one.
    async fn upsert(&self, record: &VectorRecord) -> Result<()> {
        self.ensure_schema().await;

        let payload = object_payload(&self.class_name, record);
        let object_id = payload.get("id").and_then(Value::as_str).map(str::to_string);

        let resp = self
            .client
            .post(self.objects_endpoint())
            .json(&payload)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {
                tracing::debug!(
                    chunk_id = %record.chunk_id,
                    object_id = object_id.as_deref().unwrap_or("<generated>"),
                    "Object created"
                );
                Ok(())
            }
            StatusCode::CONFLICT => {
                let Some(id) = object_id else {
                    return Err(VectorError::Conflict(record.chunk_id.clone()));
                };
                let resp = self
                    .client
                    .put(format!("{}/{id}", self.objects_endpoint()))
                    .json(&payload)
                    .send()
                    .await?;
                if matches!(resp.status(), StatusCode::OK | StatusCode::NO_CONTENT) {
                    tracing::debug!(object_id = %id, "Object replaced");
                    Ok(())
                } else {
                    Err(status_error(resp).await)
                }
            }
            _ => {
                let err = status_error(resp).await;
                tracing::error!(chunk_id = %record.chunk_id, error = %err, "Upsert failed");
                Err(err)
            }
        }
    }

    /// Search errors degrade to an empty result so callers can fall back.
    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Hit>> {
        let body = json!({
            "query": near_vector_query(&self.class_name, vector, self.distance, top_k),
        });

        let resp = match self.client.post(self.graphql_endpoint()).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "GraphQL search request failed");
                return Ok(Vec::new());
            }
        };

        if resp.status() != StatusCode::OK {
            let err = status_error(resp).await;
            tracing::warn!(error = %err, "GraphQL search returned an error status");
            return Ok(Vec::new());
        }

        match resp.json::<Value>().await {
            Ok(body) => {
                if let Some(errors) = body.get("errors") {
                    tracing::warn!(errors = %errors, "GraphQL search reported errors");
                }
                Ok(parse_search_response(&body, &self.class_name))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode GraphQL response");
                Ok(Vec::new())
            }
        }
    }
}

// ── Payloads ─────────────────────────────────────────────────────

/// Class definition for chunk objects.
fn class_schema(class_name: &str) -> Value {
    json!({
        "class": class_name,
        "vectorizer": "none",
        "properties": [
            {"name": "text", "dataType": ["text"]},
            {"name": "source_id", "dataType": ["text"]},
            {"name": "chunk_id", "dataType": ["text"]},
            {"name": "chunk_index", "dataType": ["int"]},
            {"name": "page", "dataType": ["int"]},
        ],
    })
}

fn schema_has_class(schema: &Value, class_name: &str) -> bool {
    schema
        .get("classes")
        .and_then(Value::as_array)
        .map(|classes| {
            classes
                .iter()
                .any(|c| c.get("class").and_then(Value::as_str) == Some(class_name))
        })
        .unwrap_or(false)
}

/// Object body for `/v1/objects`. The chunk id itself is kept as a
/// property; it becomes the object id only when it is already a UUID,
/// since Weaviate rejects anything else with 422.
fn object_payload(class_name: &str, record: &VectorRecord) -> Value {
    let mut payload = json!({
        "class": class_name,
        "properties": {
            "text": record.text,
            "source_id": record.source_id,
            "chunk_index": record.chunk_index,
            "page": record.page,
            "chunk_id": record.chunk_id,
        },
        "vector": record.vector,
    });

    if Uuid::parse_str(record.chunk_id.as_str()).is_ok() {
        payload["id"] = Value::String(record.chunk_id.0.clone());
    }
    payload
}

fn near_vector_query(class_name: &str, vector: &[f32], distance: f32, top_k: usize) -> String {
    let vector_json = serde_json::to_string(vector).unwrap_or_else(|_| "[]".to_string());
    format!(
        "{{ Get {{ {class_name}(nearVector: {{vector: {vector_json}, distance: {distance}}}, limit: {top_k}) {{ \
         text source_id chunk_index page chunk_id _additional {{ distance }} }} }} }}"
    )
}

fn parse_search_response(body: &Value, class_name: &str) -> Vec<Hit> {
    let Some(objects) = body
        .pointer(&format!("/data/Get/{class_name}"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    objects
        .iter()
        .map(|obj| Hit {
            text: obj.get("text").and_then(Value::as_str).map(str::to_string),
            source_id: obj
                .get("source_id")
                .and_then(Value::as_str)
                .map(SourceId::from),
            chunk_index: obj
                .get("chunk_index")
                .and_then(Value::as_u64)
                .map(|v| v as u32),
            page: obj.get("page").and_then(Value::as_u64).map(|v| v as u32),
            chunk_id: obj
                .get("chunk_id")
                .and_then(Value::as_str)
                .map(|s| ChunkId(s.to_string())),
            score: obj
                .pointer("/_additional/distance")
                .and_then(Value::as_f64)
                .map(|d| 1.0 - d),
        })
        .collect()
}

async fn status_error(resp: reqwest::Response) -> VectorError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    VectorError::Status { status, body }
}
