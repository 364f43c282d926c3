//! DealHub CRM server.
//!
//! Serves the CRM JSON API and the built single-page app. Storage is SQLite;
//! if it cannot be reached the API keeps working from seeded in-memory data.

mod auth;
mod config;
mod cors;
mod error;
mod routes;
mod state;

use database::{Database, DatabaseHandler};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "dealhub_server=info,dealhub_database=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting DealHub server");

    let db = open_database(&config.database_url).await?;
    let pool = db.clone();

    let handler = DatabaseHandler::new(db);
    if handler.check_connection().await {
        info!("Using relational storage");
    }

    let addr = config.addr;
    let app = routes::router(AppState::new(handler, config));

    info!(addr = %addr, "DealHub server listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Connect and migrate, or fall back to a pool that connects on first use.
async fn open_database(url: &str) -> database::Result<Database> {
    let connected = match Database::connect(url).await {
        Ok(db) => db.migrate().await.map(|_| db),
        Err(err) => Err(err),
    };

    match connected {
        Ok(db) => Ok(db),
        Err(err) => {
            warn!(error = %err, "Database unavailable at startup");
            Database::connect_lazy(url)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
