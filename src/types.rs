// Shared error type for HTTP handlers

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Machine-readable code returned with HTTP 429 when the admission gate denies
/// an inquiry.
pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Too many inquiries from this address")]
    RateLimited { hours_remaining: Option<i64> },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::RateLimited { hours_remaining } => serde_json::json!({
                "success": false,
                "error": RATE_LIMIT_EXCEEDED,
                "hoursRemaining": hours_remaining,
            }),
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                // Internal causes are logged, never echoed to the client
                error!(error = %self, "Request failed");
                serde_json::json!({
                    "success": false,
                    "error": "Internal server error",
                })
            }
            AppError::InvalidRequest(msg) | AppError::Auth(msg) | AppError::NotFound(msg) => {
                serde_json::json!({
                    "success": false,
                    "error": msg,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
