//! Bearer token guard for admin routes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Reject requests that do not carry the configured admin token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    if token != state.config.admin_token {
        tracing::warn!(path = %request.uri().path(), "Rejected admin request with invalid token");
        return Err(ApiError::Forbidden("Invalid or expired token".to_string()));
    }

    Ok(next.run(request).await)
}
