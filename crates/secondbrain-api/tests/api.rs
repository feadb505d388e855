//! Router tests against an in-memory vector store and a temp data dir.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use secondbrain_agents::embedding::HashEmbedder;
use secondbrain_agents::store::ChunkStore;
use secondbrain_agents::RootAgent;
use secondbrain_api::routes::MISSING_INPUT;
use secondbrain_api::{build_router, AppState};
use secondbrain_core::config::VectorBackend;
use secondbrain_core::BrainConfig;
use secondbrain_vector::MemoryVectorStore;

fn app(dir: &std::path::Path) -> Router {
    let mut config = BrainConfig::default();
    config.data_dir = dir.to_string_lossy().into_owned();
    config.vector.backend = VectorBackend::Memory;

    let agent = RootAgent::new(
        &config,
        Arc::new(HashEmbedder::new(config.embedding.dim)),
        Arc::new(MemoryVectorStore::default()),
        ChunkStore::open(dir).unwrap(),
        None,
    );
    build_router(AppState::new(agent))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_post(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let boundary = "secondbrain-test-boundary";
    let mut body = String::new();
    for (name, filename, value) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match filename {
            Some(f) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                 Content-Type: text/plain\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn root_reports_service() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "service": "secondbrain" }));
}

#[tokio::test]
async fn ingest_json_content() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(
        &app,
        json_post("/ingest", json!({ "content": "Rust has ownership. Borrowing is checked." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ingested_chunks"], 1);
    assert!(body["source_id"].as_str().unwrap().starts_with("txt-"));
}

#[tokio::test]
async fn ingest_form_with_trailing_slash() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let request = Request::post("/ingest/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("content=Remember+the+milk."))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ingested_chunks"], 1);
}

#[tokio::test]
async fn ingest_multipart_file_wins_over_content() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let request = multipart_post(
        "/ingest",
        &[
            ("content", None, "This text is ignored."),
            ("file", Some("notes.txt"), "Meeting notes. Ship on Friday."),
        ],
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source_id"], "notes.txt");

    let (status, body) = send(
        &app,
        Request::get("/sources/notes.txt").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"][0]["text"], "Meeting notes. Ship on Friday.");
}

/// Repeats a short sentence until the text is at least `bytes` long.
fn text_of_size(bytes: usize) -> String {
    let sentence = "Lorem ipsum dolor sit amet. ";
    sentence.repeat(bytes / sentence.len() + 1)
}

#[tokio::test]
async fn upload_above_two_mib_is_accepted() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let text = text_of_size(3 * 1024 * 1024);
    let (status, body) = send(
        &app,
        multipart_post("/ingest", &[("file", Some("big.txt"), text.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["source_id"], "big.txt");
    assert!(body["ingested_chunks"].as_u64().unwrap() > 1);
}

#[tokio::test]
async fn upload_above_body_limit_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let text = text_of_size(26 * 1024 * 1024);
    let (status, _) = send(
        &app,
        multipart_post("/ingest", &[("file", Some("huge.txt"), text.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!tmp.path().join("huge.txt.json").exists());
}

#[tokio::test]
async fn ingest_multipart_content_only() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(
        &app,
        multipart_post("/ingest", &[("content", None, "Just some text.")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ingest_without_input_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(&app, json_post("/ingest", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], MISSING_INPUT);

    let (status, body) = send(&app, Request::post("/ingest").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], MISSING_INPUT);
}

#[tokio::test]
async fn whitespace_content_is_ingested_as_is() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(&app, json_post("/ingest", json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ingested_chunks"], 1);
}

#[tokio::test]
async fn query_requires_text() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(&app, json_post("/query", json!({ "query": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "query is required");

    let (status, _) = send(&app, json_post("/query/", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_answers_with_sources() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    send(
        &app,
        json_post("/ingest", json!({ "content": "The capital of France is Paris. It is lovely in spring." })),
    )
    .await;

    let (status, body) = send(
        &app,
        json_post("/query", json!({ "query": "capital of France", "top_k": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["answer"]
        .as_str()
        .unwrap()
        .contains("The capital of France is Paris"));
    assert_eq!(body["sources"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_memory_gives_fallback_answer() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(&app, json_post("/query", json!({ "query": "anything" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["answer"],
        "I couldn't find relevant information in your memory."
    );
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test]
async fn sources_listing_and_missing_source() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (_, ingested) = send(&app, json_post("/ingest", json!({ "content": "One note." }))).await;

    let (status, body) = send(&app, Request::get("/sources").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["sources"],
        json!([{ "source_id": ingested["source_id"], "chunks": 1 }])
    );

    let (status, body) = send(
        &app,
        Request::get("/sources/does-not-exist").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("does-not-exist"));
}
