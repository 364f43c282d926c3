//! Route handlers for the CRM API.

pub mod admin;
pub mod entities;
pub mod health;
pub mod metrics;

use axum::http::Uri;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use database::{Account, ActiveDeal, ActivityLog, Contact, Lead, Pagination};
use serde::Serialize;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::auth::require_admin;
use crate::cors;
use crate::error::ApiError;
use crate::state::AppState;

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            pagination: None,
            message: Some(message.into()),
        }
    }
}

/// Build the application with all routes and layers.
pub fn router(state: AppState) -> Router {
    let admin = admin::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_admin,
    ));

    let api = Router::new()
        .nest("/contacts", entities::routes::<Contact>())
        .nest("/accounts", entities::routes::<Account>())
        .nest("/deals", entities::routes::<ActiveDeal>())
        .nest("/leads", entities::routes::<Lead>())
        .nest("/activities", entities::routes::<ActivityLog>())
        .nest("/admin", admin)
        .fallback(api_not_found);

    let mut app = Router::new()
        .route("/health", get(health::health))
        .nest("/api", api);

    let spa_dir = &state.config.spa_dir;
    if spa_dir.is_dir() {
        tracing::info!(dir = %spa_dir.display(), "Serving single-page app");
        let index = ServeFile::new(spa_dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(spa_dir).not_found_service(index));
    } else {
        tracing::warn!(dir = %spa_dir.display(), "SPA directory not found, serving API only");
    }

    app.layer(cors::layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn api_not_found(uri: Uri) -> ApiError {
    tracing::debug!(path = %uri.path(), "Unknown API endpoint");
    ApiError::NotFound("API endpoint not found".to_string())
}


#[cfg(test)]
mod tests {
    use super::router;
    use super::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let app = router(relational_state().await);

        let (status, body) = get(&app, "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "error": "API endpoint not found" }));

        let (status, body) = get(&app, "/api/contacts/cnt1/extra").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "API endpoint not found");
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() {
        let app = router(relational_state().await);

        let (status, body) = get(&app, "/api/admin/users").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Access token required");

        let (status, body) =
            send(&app, Method::GET, "/api/admin/users", None, Some("wrong")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Invalid or expired token");

        let (status, body) = admin(&app, Method::GET, "/api/admin/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
}
