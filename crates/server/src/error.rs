//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Malformed or rejected request.
    #[error("{0}")]
    BadRequest(String),

    /// No bearer token.
    #[error("Access token required")]
    Unauthorized,

    /// Caller may not perform this action.
    #[error("{0}")]
    Forbidden(String),

    /// Record or route does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{} not found", entity))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Database(DatabaseError::Validation(_))
            | ApiError::Database(DatabaseError::AlreadyExists { .. })
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let message = match &self {
            ApiError::Database(DatabaseError::Validation(err)) => err.to_string(),
            ApiError::Database(DatabaseError::AlreadyExists { entity, .. }) => {
                format!("{} already exists", entity)
            }
            ApiError::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
