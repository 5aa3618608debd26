use axum::{extract::State, Json};
use sched_core::ProblemInstance;
use serde::Serialize;
use tracing::info;
use types::SolveEnvelope;
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

/// Validates the instance up front so malformed input never reaches a job.
#[utoipa::path(
    post,
    path = "/v1/solve",
    request_body = SolveEnvelope,
    responses(
        (status = 200, description = "Job enqueued", body = JobCreated),
        (status = 400, description = "Instance failed validation")
    )
)]
pub async fn solve(
    State(state): State<AppState>,
    Json(env): Json<SolveEnvelope>,
) -> Result<Json<JobCreated>, ApiError> {
    let instance = ProblemInstance::new(env.instance)?;
    let params = state.with_defaults(env.params);
    let id = state.jobs.enqueue(instance, params);
    info!(job = %id.0, "solve enqueued");
    Ok(Json(JobCreated {
        job_id: id.0,
        status: "queued",
    }))
}
