use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

pub fn health_routes() -> Router {
    Router::new().route("/", get(root))
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "secondbrain" }))
}
