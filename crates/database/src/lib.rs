//! Persistence layer for DealHub CRM.
//!
//! Records live in SQLite through SQLx. If the database cannot be reached,
//! [`DatabaseHandler`] switches to a seeded in-memory store and serves every
//! later operation from it until the process restarts.
//!
//! # Example
//!
//! ```no_run
//! use dealhub_database::{Database, DatabaseHandler, ListQuery, models::Contact};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:dealhub.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let handler = DatabaseHandler::new(db);
//!     let page = handler.list::<Contact>(&ListQuery::new(1, 10)).await?;
//!     println!("{} contacts", page.pagination.total);
//!
//!     Ok(())
//! }
//! ```

pub mod entities;
pub mod entity;
pub mod error;
pub mod handler;
pub mod memory;
pub mod models;
pub mod normalize;
pub mod seed;
pub mod sqlite;
pub mod store;
pub mod validation;

pub use entity::{Entity, EntityDescriptor, Fields};
pub use error::{DatabaseError, Result};
pub use handler::DatabaseHandler;
pub use memory::InMemoryDatabase;
pub use models::{
    Account, ActiveDeal, ActivityLog, Contact, Lead, ListQuery, Page, Pagination, Role,
    UserProfile,
};
pub use seed::SYSTEM_ADMIN_EMAIL;
pub use store::RelationalStore;
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Acquire timeout for pools created without connecting.
    const LAZY_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> dealhub_database::Result<()> {
    /// // File database
    /// let db = dealhub_database::Database::connect("sqlite:data/dealhub.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = dealhub_database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Create a pool without opening a connection.
    ///
    /// Connection errors surface on first use, which lets a
    /// [`DatabaseHandler`] fall back instead of failing at startup.
    pub fn connect_lazy(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(Self::DEFAULT_POOL_SIZE)
            .acquire_timeout(Self::LAZY_ACQUIRE_TIMEOUT)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
