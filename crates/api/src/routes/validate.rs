use axum::Json;
use sched_core::validate;
use serde::Serialize;
use types::Instance;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = Instance,
    responses(
        (status = 200, description = "Validation result", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(inst): Json<Instance>) -> Json<ValidationReport> {
    Json(match validate(&inst) {
        Ok(()) => ValidationReport {
            ok: true,
            errors: vec![],
        },
        Err(e) => ValidationReport {
            ok: false,
            errors: e.messages().to_vec(),
        },
    })
}
