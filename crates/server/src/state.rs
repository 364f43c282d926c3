//! Application state shared across handlers.

use std::sync::Arc;

use database::DatabaseHandler;

use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Persistence handler with in-memory fallback.
    pub db: Arc<DatabaseHandler>,
    /// Server configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: DatabaseHandler, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
        }
    }
}
