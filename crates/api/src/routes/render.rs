use axum::Json;
use sched_core::audit::{audit, Violation};
use sched_core::grid::{render_group_grids, GroupGrid};
use sched_core::ProblemInstance;
use serde::{Deserialize, Serialize};
use types::{Instance, Solution};
use utoipa::ToSchema;

use crate::error::ApiError;

#[derive(Deserialize, ToSchema)]
pub struct SolutionIn {
    pub instance: Instance,
    pub solution: Solution,
}

#[derive(Serialize, ToSchema)]
pub struct AuditReport {
    pub ok: bool,
    pub violations: Vec<Violation>,
}

#[utoipa::path(
    post,
    path = "/v1/render",
    request_body = SolutionIn,
    responses(
        (status = 200, description = "Weekly grid per group", body = Vec<GroupGrid>),
        (status = 400, description = "Instance failed validation")
    )
)]
pub async fn render(Json(input): Json<SolutionIn>) -> Result<Json<Vec<GroupGrid>>, ApiError> {
    let instance = ProblemInstance::new(input.instance)?;
    Ok(Json(render_group_grids(&instance, &input.solution)))
}

#[utoipa::path(
    post,
    path = "/v1/audit",
    request_body = SolutionIn,
    responses(
        (status = 200, description = "Hard-constraint violations of the timetable", body = AuditReport),
        (status = 400, description = "Instance failed validation")
    )
)]
pub async fn audit_solution(Json(input): Json<SolutionIn>) -> Result<Json<AuditReport>, ApiError> {
    let instance = ProblemInstance::new(input.instance)?;
    let violations = audit(&instance, &input.solution);
    Ok(Json(AuditReport {
        ok: violations.is_empty(),
        violations,
    }))
}
