//! Pack job API handlers.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use skinforge_core::metrics::PACKS_DOWNLOADED;
use skinforge_core::{
    is_valid_player_name, CreateJobRequest, Job, JobError, JobFilter, JobStatus,
};

use crate::api::middleware::Submitter;
use crate::state::AppState;

/// Maximum number of player names per pack
pub const MAX_NAMES: usize = 20;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a pack
#[derive(Debug, Deserialize)]
pub struct SubmitPackBody {
    /// Player names to include in the pack
    pub names: Vec<String>,
}

/// Response for pack operations
#[derive(Debug, Serialize)]
pub struct PackResponse {
    pub id: String,
    pub status: JobStatus,
    pub names: Vec<String>,
    pub created_at: String,
    /// Number of packs waiting in the queue, this one included if waiting
    pub packs_waiting: i64,
}

impl PackResponse {
    fn new(job: Job, packs_waiting: i64) -> Self {
        Self {
            id: job.id,
            status: job.status,
            names: job.names,
            created_at: job.created_at.to_rfc3339(),
            packs_waiting,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct PackErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<PackErrorResponse>) {
    (
        status,
        Json(PackErrorResponse {
            error: message.into(),
        }),
    )
}

fn waiting_count(state: &AppState) -> i64 {
    state
        .store()
        .count(&JobFilter::new().with_status(JobStatus::Waiting))
        .unwrap_or(0)
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new pack generation job
pub async fn submit_pack(
    State(state): State<Arc<AppState>>,
    Submitter(submitter): Submitter,
    Json(body): Json<SubmitPackBody>,
) -> Result<(StatusCode, Json<PackResponse>), impl IntoResponse> {
    if body.names.is_empty() || body.names.len() > MAX_NAMES {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("expected between 1 and {} player names", MAX_NAMES),
        ));
    }

    if let Some(invalid) = body.names.iter().find(|name| !is_valid_player_name(name)) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("invalid player name: {}", invalid),
        ));
    }

    match state.guard().check(submitter.as_deref()) {
        Ok(()) => {}
        Err(JobError::ActiveJobExists(_)) => {
            return Err(error_response(
                StatusCode::CONFLICT,
                "a pack is already being generated for this client",
            ));
        }
        Err(e) => return Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }

    let request = CreateJobRequest {
        submitter,
        names: body.names,
    };

    match state.store().create(request) {
        Ok(job) => {
            tracing::info!(job_id = %job.id, names = job.names.len(), "pack job submitted");
            let packs_waiting = waiting_count(&state);
            Ok((StatusCode::CREATED, Json(PackResponse::new(job, packs_waiting))))
        }
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// Get a pack job by ID
pub async fn get_pack(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PackResponse>, impl IntoResponse> {
    match state.store().get(&id) {
        Ok(Some(job)) => {
            let packs_waiting = waiting_count(&state);
            Ok(Json(PackResponse::new(job, packs_waiting)))
        }
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("pack not found: {}", id),
        )),
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// Download a finished pack archive.
///
/// Downloads are single-use: once the archive bytes are read, the job row
/// and its artifact directory are deleted. A second request for the same
/// id gets a 404 like any unknown pack.
pub async fn download_pack(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<PackErrorResponse>)> {
    let job = match state.store().get(&id) {
        Ok(Some(job)) => job,
        Ok(None) => {
            return Err(error_response(
                StatusCode::NOT_FOUND,
                format!("pack not found: {}", id),
            ));
        }
        Err(e) => return Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    };

    if job.status != JobStatus::Ready {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            format!("pack not ready: {}", id),
        ));
    }

    let archive_path = state.assembler().artifact_path(&id);
    let bytes = match tokio::fs::read(&archive_path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(job_id = %id, error = %e, "ready pack has no archive on disk");
            return Err(error_response(
                StatusCode::NOT_FOUND,
                format!("pack not ready: {}", id),
            ));
        }
    };

    if let Err(e) = state.store().delete(&id) {
        tracing::warn!(job_id = %id, error = %e, "failed to delete pack job after download");
    }
    if let Err(e) = state.assembler().remove_artifact(&id) {
        tracing::warn!(job_id = %id, error = %e, "failed to remove pack artifact after download");
    }

    PACKS_DOWNLOADED.inc();
    tracing::info!(job_id = %id, bytes = bytes.len(), "pack downloaded");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", skinforge_core::ARCHIVE_NAME),
            ),
        ],
        bytes,
    ))
}
