use axum::Json;
use types::Instance;

#[utoipa::path(
    get,
    path = "/v1/health",
    responses((status = 200, description = "OK"))
)]
pub async fn health() -> &'static str {
    "ok"
}

#[utoipa::path(
    get,
    path = "/v1/template",
    responses((status = 200, description = "Sample instance to start from", body = Instance))
)]
pub async fn template() -> Json<Instance> {
    Json(sched_core::template::template_instance())
}
