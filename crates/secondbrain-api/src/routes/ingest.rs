use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    routing::post,
    Form, Json, Router,
};
use serde::Deserialize;

use secondbrain_agents::IngestInput;
use secondbrain_core::IngestReport;

use crate::error::ApiError;
use crate::server::AppState;

pub const MISSING_INPUT: &str = "Please provide `content` or upload a `file`";

pub fn ingest_routes() -> Router<AppState> {
    Router::new()
        .route("/ingest", post(ingest))
        .route("/ingest/", post(ingest))
}

#[derive(Debug, Default, Deserialize)]
struct IngestBody {
    content: Option<String>,
}

/// Accepts multipart (`file` and/or `content`), urlencoded or JSON bodies.
/// A non-empty file wins over content.
async fn ingest(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<IngestReport>, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let input = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        read_multipart(multipart).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<IngestBody>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        text_input(body.content)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(body) = Form::<IngestBody>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        text_input(body.content)
    } else {
        None
    };

    let input = input.ok_or_else(|| ApiError::BadRequest(MISSING_INPUT.to_string()))?;
    let report = state.agent.handle_ingest(input).await?;
    Ok(Json(report))
}

fn text_input(content: Option<String>) -> Option<IngestInput> {
    content
        .filter(|c| !c.is_empty())
        .map(|content| IngestInput::Text { content })
}

async fn read_multipart(mut multipart: Multipart) -> Result<Option<IngestInput>, ApiError> {
    let mut content = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if !bytes.is_empty() {
                    tracing::debug!(filename = %filename, bytes = bytes.len(), "File field received");
                    file = Some(IngestInput::File {
                        bytes: bytes.to_vec(),
                        filename,
                    });
                }
            }
            Some("content") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                content = text_input(Some(text));
            }
            _ => {}
        }
    }

    Ok(file.or(content))
}
