//! Local web front end.
//!
//! Routes:
//! - `GET /` upload page
//! - `POST /analyze` multipart upload (`code_file`, optional `summarize`)
//! - `GET /history`, `GET /history/:id`
//! - `GET /health`

pub mod upload;

use crate::error::StoreError;
use crate::history::RecordSource;
use crate::service::{AnalyzeOptions, Analyzer};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

const INDEX_HTML: &str = include_str!("../../templates/index.html");

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub upload_dir: Arc<PathBuf>,
}

/// A JSON error body with its status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RecordNotFound(_) => Self::new(StatusCode::NOT_FOUND, "Record not found"),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/history", get(list_history))
        .route("/history/:id", get(show_history))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

struct UploadForm {
    filename: Option<String>,
    bytes: Vec<u8>,
    summarize: bool,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        filename: None,
        bytes: Vec::new(),
        summarize: false,
    };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("code_file") => {
                form.filename = Some(field.file_name().unwrap_or_default().to_string());
                form.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?
                    .to_vec();
            }
            Some("summarize") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                form.summarize = matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "on" | "yes"
                );
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let multipart = multipart.map_err(|_| ApiError::bad_request("No file uploaded"))?;
    let form = read_form(multipart).await?;
    let Some(raw_name) = form.filename else {
        return Err(ApiError::bad_request("No file uploaded"));
    };
    if raw_name.is_empty() {
        return Err(ApiError::bad_request("Empty filename"));
    }
    let filename = upload::secure_filename(&raw_name, &upload::fallback_stem(&form.bytes));
    if filename.is_empty() {
        return Err(ApiError::bad_request("Invalid filename"));
    }

    upload::save_upload(&state.upload_dir, &filename, &form.bytes)
        .await
        .map_err(|e| {
            error!("Failed to save upload {}: {}", filename, e);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save upload")
        })?;

    let options = AnalyzeOptions {
        summarize: form.summarize,
        record: Some(RecordSource::Upload),
    };
    match state.analyzer.analyze(&filename, form.bytes, &options).await {
        Ok(analysis) => Ok(Json(json!({
            "status": "success",
            "filename": analysis.filename,
            "content_hash": analysis.content_hash,
            "cached": analysis.cached,
            "structure": analysis.structure,
            "summaries": analysis.summaries,
            "record_id": analysis.record_id,
        }))),
        Err(e) => Ok(Json(json!({
            "status": "error",
            "message": e.to_string(),
        }))),
    }
}

async fn list_history(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let records = match state.analyzer.history() {
        Some(history) => history.list()?,
        None => Vec::new(),
    };
    Ok(Json(json!(records)))
}

async fn show_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let history = state
        .analyzer
        .history()
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Record not found"))?;
    let record = history.load(&id)?;
    Ok(Json(json!(record)))
}
