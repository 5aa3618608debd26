use axum::{
    extract::{Path, State},
    Json,
};
use jobs::JobStatus;
use serde::Serialize;
use types::{Solution, SolveStats};
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct JobResult {
    pub solution: Solution,
    pub stats: SolveStats,
}

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job status", body = JobStatus),
        (status = 404, description = "Unknown job")
    )
)]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobStatus>, ApiError> {
    state.jobs.get(&id).map(Json).ok_or(ApiError::NotFound(id))
}

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}/result",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Timetable of a solved job", body = JobResult),
        (status = 404, description = "Unknown job"),
        (status = 409, description = "Job is pending or ended without a timetable")
    )
)]
pub async fn result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobResult>, ApiError> {
    match state.jobs.get(&id) {
        Some(JobStatus::Solved { solution, stats }) => Ok(Json(JobResult { solution, stats })),
        Some(_) => Err(ApiError::NoResult(id)),
        None => Err(ApiError::NotFound(id)),
    }
}
