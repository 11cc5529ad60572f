use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::watchdog::WatchdogError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Watchdog(#[from] WatchdogError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::Watchdog(err @ WatchdogError::NotFound(_)) => (StatusCode::NOT_FOUND, err.kind()),
            AppError::Watchdog(err) => (StatusCode::BAD_REQUEST, err.kind()),
        };
        (
            status,
            Json(serde_json::json!({ "error": kind, "detail": self.to_string() })),
        )
            .into_response()
    }
}
