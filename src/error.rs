use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

/// Message returned to callers when the upstream provider does not answer in time.
pub const UPSTREAM_TIMEOUT_MESSAGE: &str =
    "Upstream timeout: the oracle did not answer in time. Please try again.";

/// Custom error type for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{}", UPSTREAM_TIMEOUT_MESSAGE)]
    UpstreamTimeout,
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Configuration(String),
    #[error("Internal error")]
    Internal(String),
}

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamTimeout
            | AppError::Upstream(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::InvalidRequest(msg) => warn!("Rejected request: {}", msg),
            AppError::UpstreamTimeout => error!("Upstream call timed out"),
            AppError::Upstream(msg) => error!("Upstream error: {}", msg),
            AppError::Configuration(msg) => error!("Configuration error: {}", msg),
            AppError::Internal(detail) => error!("Internal error: {}", detail),
        }

        let body = Json(ErrorResponse {
            ok: false,
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;
