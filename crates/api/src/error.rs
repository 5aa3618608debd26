use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sched_core::ValidationError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("job {0} not found")]
    NotFound(String),
    #[error("job {0} has no timetable")]
    NoResult(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, body) = match &self {
            ApiError::Invalid(e) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "errors": e.messages() }),
            ),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            ApiError::NoResult(_) => (StatusCode::CONFLICT, json!({ "error": self.to_string() })),
        };
        (code, Json(body)).into_response()
    }
}
