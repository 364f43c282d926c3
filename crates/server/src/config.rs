//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "https://dealhub.yitrobc.net",
    "https://www.dealhub.yitrobc.net",
];

/// CRM server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Bearer token accepted on admin routes.
    pub admin_token: String,
    /// Directory holding the built single-page app.
    pub spa_dir: PathBuf,
    /// Browser origins allowed to call the API.
    pub cors_origins: Vec<String>,
    /// Administrator account that can never be deleted.
    pub system_admin_email: String,
    /// Whether SMTP credentials are present.
    pub smtp_configured: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DEALHUB_ADDR` | Server bind address | `0.0.0.0:3000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:dealhub.db?mode=rwc` |
    /// | `ADMIN_TOKEN` | Admin bearer token | (required) |
    /// | `SPA_DIR` | Built SPA directory | `dist/spa` |
    /// | `CORS_ORIGINS` | Comma-separated allowed origins | local dev and production hosts |
    /// | `SYSTEM_ADMIN_EMAIL` | Undeletable admin account | `admin@yitro.com` |
    /// | `EMAIL_USER`, `EMAIL_PASS` | SMTP credentials | (unset) |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("DEALHUB_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:dealhub.db?mode=rwc".to_string());

        let admin_token = env::var("ADMIN_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingAdminToken)?;

        let spa_dir = env::var("SPA_DIR").unwrap_or_else(|_| "dist/spa".to_string());

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(list) => parse_origins(&list),
            Err(_) => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let system_admin_email = env::var("SYSTEM_ADMIN_EMAIL")
            .unwrap_or_else(|_| database::SYSTEM_ADMIN_EMAIL.to_string());

        let smtp_configured = env::var("EMAIL_USER").is_ok_and(|v| !v.is_empty())
            && env::var("EMAIL_PASS").is_ok_and(|v| !v.is_empty());

        Ok(Self {
            addr,
            database_url,
            admin_token,
            spa_dir: PathBuf::from(spa_dir),
            cors_origins,
            system_admin_email,
            smtp_configured,
        })
    }
}

fn parse_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid DEALHUB_ADDR format")]
    InvalidAddr,

    #[error("ADMIN_TOKEN environment variable is required")]
    MissingAdminToken,
}

#[cfg(test)]
impl Config {
    /// Configuration for router tests.
    pub fn for_tests() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: "sqlite::memory:".to_string(),
            admin_token: "test-admin-token".to_string(),
            spa_dir: PathBuf::from("does-not-exist/spa"),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            system_admin_email: database::SYSTEM_ADMIN_EMAIL.to_string(),
            smtp_configured: false,
        }
    }
}
