mod config;
mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod health;
    pub mod jobs;
    pub mod render;
    pub mod solve;
    pub mod validate;
}

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppConfig, state::AppState};

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::health::template,
        routes::validate::validate_handler,
        routes::solve::solve,
        routes::jobs::status,
        routes::jobs::result,
        routes::render::render,
        routes::render::audit_solution,
    ),
    components(schemas(
        types::Instance, types::Teacher, types::Group, types::Room, types::Course,
        types::Workload, types::Preassignment, types::SlotTime, types::RoomType,
        types::CourseKind, types::GroupKind, types::SolveParams, types::SolveEnvelope,
        types::SessionDecision, types::Solution, types::SolveStats, types::SolveOutcome,
        types::TeacherId, types::GroupId, types::RoomId, types::CourseId,
        sched_core::InputError, sched_core::ConflictKind,
        sched_core::audit::Violation, sched_core::audit::ViolationKind,
        sched_core::grid::GroupGrid, sched_core::grid::GridRow,
        jobs::JobId, jobs::JobStatus,
        routes::validate::ValidationReport,
        routes::solve::JobCreated,
        routes::jobs::JobResult,
        routes::render::SolutionIn,
        routes::render::AuditReport,
    )),
    tags(
        (name = "timetable", description = "Weekly course timetabling API")
    )
)]
struct ApiDoc;

fn app(state: AppState) -> Router {
    let body_limit = state.config.body_limit;
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/template", get(routes::health::template))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/solve", post(routes::solve::solve))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/render", post(routes::render::render))
        .route("/v1/audit", post(routes::render::audit_solution))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::disable())
        .layer(telemetry::stack(body_limit))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env()?;
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = app(AppState::new(config));

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(AppState::new(AppConfig::default()))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => req
                .header("content-type", "application/json")
                .body(Body::from(b.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let code = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (code, value)
    }

    fn template() -> Value {
        serde_json::to_value(sched_core::template::template_instance()).unwrap()
    }

    #[tokio::test]
    async fn validate_reports_messages() {
        let app = test_app();
        let (code, body) = call(&app, "POST", "/v1/validate", Some(template())).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["ok"], true);

        let mut bad = template();
        bad["slotsPerDay"] = json!(0);
        let (code, body) = call(&app, "POST", "/v1/validate", Some(bad)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["ok"], false);
        assert!(!body["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn solve_then_fetch_result() {
        let app = test_app();
        let (code, created) = call(
            &app,
            "POST",
            "/v1/solve",
            Some(json!({ "instance": template(), "params": { "seed": 7 } })),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
        let id = created["jobId"].as_str().unwrap().to_string();

        let mut status = Value::Null;
        for _ in 0..200 {
            let (_, s) = call(&app, "GET", &format!("/v1/jobs/{id}"), None).await;
            if s["status"] != "queued" && s["status"] != "running" {
                status = s;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(status["status"], "solved");

        let (code, result) = call(&app, "GET", &format!("/v1/jobs/{id}/result"), None).await;
        assert_eq!(code, StatusCode::OK);
        // 3 lectures plus 1 lab
        assert_eq!(result["solution"]["sessions"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn invalid_instance_is_not_enqueued() {
        let app = test_app();
        let mut bad = template();
        bad["workloads"][0]["teacherId"] = json!("NOBODY");
        let (code, body) = call(&app, "POST", "/v1/solve", Some(json!({ "instance": bad }))).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn oversized_calendar_is_rejected_before_solving() {
        let app = test_app();
        let mut bad = template();
        bad["slotTimes"] = json!([]);
        bad["slotsPerDay"] = json!(4_000_000_000u32);
        let (code, body) = call(&app, "POST", "/v1/solve", Some(json!({ "instance": bad }))).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert!(body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .any(|m| m.as_str().is_some_and(|m| m.contains("slotsPerDay"))));
    }

    #[tokio::test]
    async fn unknown_job_is_404() {
        let (code, _) = call(&test_app(), "GET", "/v1/jobs/missing", None).await;
        assert_eq!(code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn render_and_audit_a_clashing_timetable() {
        let app = test_app();
        let session = json!({
            "groupId": "SY-A", "courseId": "SUB1", "teacherId": "T1",
            "durationSlots": 1, "day": "Mon", "startSlotIndex": 0, "roomId": "CR1"
        });
        let input = json!({
            "instance": template(),
            "solution": { "sessions": [session.clone(), session] }
        });

        let (code, grids) = call(&app, "POST", "/v1/render", Some(input.clone())).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(grids.as_array().unwrap().len(), 2);
        assert_eq!(grids[0]["groupId"], "SY-A");
        assert_eq!(grids[0]["rows"][0]["cells"][0].as_array().unwrap().len(), 2);

        let (code, report) = call(&app, "POST", "/v1/audit", Some(input)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(report["ok"], false);
        // teacher, group and room all clash
        assert_eq!(report["violations"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn template_round_trips_through_validate() {
        let app = test_app();
        let (code, inst) = call(&app, "GET", "/v1/template", None).await;
        assert_eq!(code, StatusCode::OK);
        let (_, report) = call(&app, "POST", "/v1/validate", Some(inst)).await;
        assert_eq!(report["ok"], true);
    }
}
