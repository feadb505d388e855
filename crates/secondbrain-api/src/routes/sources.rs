use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use secondbrain_core::SourceId;

use crate::error::ApiError;
use crate::server::AppState;

pub fn source_routes() -> Router<AppState> {
    Router::new()
        .route("/sources", get(list_sources))
        .route("/sources/{source_id}", get(get_source))
}

async fn list_sources(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let sources = state.agent.list_sources()?;
    Ok(Json(json!({ "sources": sources })))
}

async fn get_source(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let chunks = state.agent.source_chunks(&SourceId(source_id.clone()))?;
    Ok(Json(json!({ "source_id": source_id, "chunks": chunks })))
}
