//! HTTP routes for the chunk and note endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use marginalia_core::{ChunkService, MarginaliaError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type AppState = Arc<ChunkService>;

/// Build the application router.
pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/chunk", post(add_chunk))
        .route("/chunk/:id", delete(delete_chunk))
        .route("/note", post(process_note))
        .route("/health", get(health))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    pub content: String,
    pub start_index: i64,
    pub end_index: i64,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BestMatch {
    pub id: i64,
    pub content: String,
    pub start_index: i64,
    pub end_index: i64,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub message: String,
    pub best_match: Option<BestMatch>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub chunks: usize,
}

/// Internal failure surfaced as a generic 500. The details are logged,
/// never returned to the caller.
#[derive(Debug)]
pub struct ApiError {
    operation: &'static str,
    source: MarginaliaError,
}

impl ApiError {
    fn wrap(operation: &'static str) -> impl FnOnce(MarginaliaError) -> Self {
        move |source| Self { operation, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(operation = self.operation, error = %self.source, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse {
                message: "Internal server error".to_string(),
            }),
        )
            .into_response()
    }
}

/// POST /chunk - encode, persist, and index a new chunk
async fn add_chunk(
    State(service): State<AppState>,
    Json(req): Json<ChunkRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    service
        .add_chunk(&req.content, req.start_index, req.end_index)
        .await
        .map_err(ApiError::wrap("add_chunk"))?;

    Ok(Json(MessageResponse {
        message: "Chunk added successfully".to_string(),
    }))
}

/// DELETE /chunk/{id} - remove a chunk and rebuild the index
async fn delete_chunk(
    State(service): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    service
        .delete_chunk(id)
        .await
        .map_err(ApiError::wrap("delete_chunk"))?;

    Ok(Json(MessageResponse {
        message: format!("Chunk {} deleted successfully", id),
    }))
}

/// POST /note - find the stored chunk most similar to the note
async fn process_note(
    State(service): State<AppState>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let matches = service
        .match_note(&req.content, 1)
        .await
        .map_err(ApiError::wrap("process_note"))?;

    let best_match = matches.into_iter().next().map(|m| BestMatch {
        id: m.id,
        content: m.content,
        start_index: m.start_index,
        end_index: m.end_index,
    });

    Ok(Json(NoteResponse {
        message: "Note processed".to_string(),
        best_match,
    }))
}

/// GET /health - liveness probe with the current chunk count
async fn health(
    State(service): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let chunks = service.chunk_count().map_err(ApiError::wrap("health"))?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        chunks,
    }))
}
