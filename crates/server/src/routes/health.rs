//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    /// `relational` or `in-memory`.
    pub storage: &'static str,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let storage = if state.db.is_using_in_memory_fallback() {
        "in-memory"
    } else {
        "relational"
    };

    Json(Health {
        status: "ok".to_string(),
        storage,
    })
}
