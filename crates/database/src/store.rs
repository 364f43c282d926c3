//! The relational store interface used by [`DatabaseHandler`].
//!
//! [`DatabaseHandler`]: crate::DatabaseHandler

use async_trait::async_trait;

use crate::entity::Entity;
use crate::Result;

/// Primary, durable storage for every entity kind.
///
/// Records passed in and returned are in token form; the handler does the
/// display conversion. Any error for which
/// [`DatabaseError::is_store_failure`](crate::DatabaseError::is_store_failure)
/// holds makes the handler switch to its in-memory store.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Count records matching an optional search term.
    async fn count<E: Entity>(&self, search: Option<&str>) -> Result<u64>;

    /// Fetch a window of matching records, newest first.
    async fn find_many<E: Entity>(
        &self,
        search: Option<&str>,
        skip: u64,
        take: u32,
    ) -> Result<Vec<E>>;

    /// Fetch a record by ID.
    async fn find_unique<E: Entity>(&self, id: &str) -> Result<Option<E>>;

    /// Insert a fully-built record and return it as stored.
    async fn create<E: Entity>(&self, record: &E) -> Result<E>;

    /// Write the listed columns of an existing record and its update stamp,
    /// in one statement. Columns not listed keep their stored values.
    ///
    /// Returns the record as stored, or `None` if no record has this ID.
    async fn update<E: Entity>(&self, record: &E, columns: &[&str]) -> Result<Option<E>>;

    /// Delete a record. Returns false if none existed.
    async fn delete<E: Entity>(&self, id: &str) -> Result<bool>;
}
