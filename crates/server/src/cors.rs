//! Cross-origin policy for browser clients.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Allow only the configured origins, with credentials.
///
/// Requests without an `Origin` header are not affected by CORS.
pub fn layer(origins: &[String]) -> CorsLayer {
    let allowed: Arc<[String]> = origins.into();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                let allowed_origin = origin
                    .to_str()
                    .is_ok_and(|origin| allowed.iter().any(|a| a == origin));
                if !allowed_origin {
                    tracing::warn!(origin = ?origin, "Blocked CORS request");
                }
                allowed_origin
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}
