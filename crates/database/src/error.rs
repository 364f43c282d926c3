//! Database error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Input rejected before reaching any store
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },
}

impl DatabaseError {
    /// Whether this error means the relational store itself failed.
    ///
    /// Only these errors switch the handler into in-memory mode; the rest are
    /// caller mistakes and are returned as-is.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, DatabaseError::Sqlx(_) | DatabaseError::Migration(_))
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_classification() {
        assert!(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).is_store_failure());
        assert!(!DatabaseError::Validation(ValidationError::Empty("firstName".into()))
            .is_store_failure());
        assert!(!DatabaseError::AlreadyExists {
            entity: "UserProfile",
            id: "a@b.com".into()
        }
        .is_store_failure());
    }
}
