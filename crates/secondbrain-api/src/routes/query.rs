use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use secondbrain_core::Answer;

use crate::error::ApiError;
use crate::server::AppState;

pub fn query_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query))
        .route("/query/", post(query))
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    top_k: Option<usize>,
}

async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Answer>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let query = request
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("query is required".to_string()))?;

    let answer = state.agent.handle_query(&query, request.top_k).await?;
    Ok(Json(answer))
}
