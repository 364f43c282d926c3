//! Fallback-aware persistence handler.
//!
//! [`DatabaseHandler`] gives route handlers one CRUD interface per entity
//! kind. Operations go to the relational store until it fails once; from then
//! on every operation is served by the in-memory store for the rest of the
//! handler's life.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tracing::{info, warn};

use crate::entity::{build_record, merge_patch, Entity, Fields};
use crate::memory::InMemoryDatabase;
use crate::models::{Contact, ListQuery, Page};
use crate::normalize::{decode_record, encode_record};
use crate::store::RelationalStore;
use crate::validation::validate_pagination;
use crate::{Database, Result};

/// Page size used when walking every page of a kind.
const LIST_ALL_PAGE_SIZE: u32 = 100;

/// CRUD over the relational store with a sticky in-memory fallback.
#[derive(Debug)]
pub struct DatabaseHandler<S = Database> {
    store: S,
    memory: InMemoryDatabase,
    degraded: AtomicBool,
}

impl<S: RelationalStore> DatabaseHandler<S> {
    /// Create a handler that starts on the relational store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            memory: InMemoryDatabase::new(),
            degraded: AtomicBool::new(false),
        }
    }

    /// The relational store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The in-memory fallback store.
    pub fn memory(&self) -> &InMemoryDatabase {
        &self.memory
    }

    /// Whether operations are being served by the in-memory store.
    pub fn is_using_in_memory_fallback(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Probe the relational store.
    ///
    /// Returns false, and switches to the in-memory store, if the probe fails.
    /// Always false once the handler has fallen back.
    pub async fn check_connection(&self) -> bool {
        if self.is_using_in_memory_fallback() {
            return false;
        }

        match self.store.count::<Contact>(None).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "Relational store unreachable, using in-memory fallback");
                self.enter_fallback();
                false
            }
        }
    }

    /// List one page of records in display form.
    pub async fn list<E: Entity>(&self, query: &ListQuery) -> Result<Page<E>> {
        validate_pagination(query.page, query.limit)?;
        let search = query.search_term();

        self.execute_with_fallback::<E, _, _, _>(
            "list",
            async move {
                let (total, rows) = futures::try_join!(
                    self.store.count::<E>(search),
                    self.store.find_many::<E>(search, query.offset(), query.limit),
                )?;
                Ok(Page::new(rows.into_iter().map(decoded).collect(), query, total))
            },
            move || {
                let mut page = self.memory.list::<E>(query);
                page.data.iter_mut().for_each(decode_record);
                Ok(page)
            },
        )
        .await
    }

    /// Walk every page of a kind and collect all records.
    pub async fn list_all<E: Entity>(&self) -> Result<Vec<E>> {
        let mut query = ListQuery::new(1, LIST_ALL_PAGE_SIZE);
        let mut records = Vec::new();

        loop {
            let page = self.list::<E>(&query).await?;
            let last = page.data.is_empty() || u64::from(query.page) >= page.pagination.total_pages;
            records.extend(page.data);
            if last {
                return Ok(records);
            }
            query.page += 1;
        }
    }

    /// Total number of records of a kind.
    pub async fn count<E: Entity>(&self) -> Result<u64> {
        let page = self.list::<E>(&ListQuery::new(1, 1)).await?;
        Ok(page.pagination.total)
    }

    /// Get a record by ID. `None` if it does not exist.
    pub async fn get<E: Entity>(&self, id: &str) -> Result<Option<E>> {
        self.execute_with_fallback::<E, _, _, _>(
            "get",
            async move { Ok(self.store.find_unique::<E>(id).await?.map(decoded)) },
            move || Ok(self.memory.get::<E>(id).map(decoded)),
        )
        .await
    }

    /// Create a record from caller-supplied fields.
    ///
    /// The fields are validated before either store is touched.
    pub async fn create<E: Entity>(&self, fields: Fields) -> Result<E> {
        let record: E = build_record(fields.clone(), E::DESCRIPTOR.new_id(), Utc::now())?;

        self.execute_with_fallback::<E, _, _, _>(
            "create",
            async move {
                let mut encoded = record;
                encode_record(&mut encoded);
                let stored = self.store.create(&encoded).await?;
                Ok(decoded(stored))
            },
            move || Ok(decoded(self.memory.create::<E>(fields)?)),
        )
        .await
    }

    /// Merge `patch` onto a record. `None` if it does not exist.
    ///
    /// The merged record is validated, but only the patched columns are
    /// written, so concurrent updates to different fields all persist.
    pub async fn update<E: Entity>(&self, id: &str, patch: Fields) -> Result<Option<E>> {
        let columns = E::DESCRIPTOR.patched_columns(&patch);
        let primary_patch = patch.clone();

        self.execute_with_fallback::<E, _, _, _>(
            "update",
            async move {
                let Some(existing) = self.store.find_unique::<E>(id).await? else {
                    return Ok(None);
                };
                let mut merged = merge_patch(&existing, primary_patch, Utc::now())?;
                encode_record(&mut merged);
                Ok(self.store.update(&merged, &columns).await?.map(decoded))
            },
            move || Ok(self.memory.update::<E>(id, patch)?.map(decoded)),
        )
        .await
    }

    /// Delete a record. False if it does not exist.
    pub async fn delete<E: Entity>(&self, id: &str) -> Result<bool> {
        self.execute_with_fallback::<E, _, _, _>(
            "delete",
            async move { self.store.delete::<E>(id).await },
            move || Ok(self.memory.delete::<E>(id)),
        )
        .await
    }

    async fn execute_with_fallback<E, T, P, F>(
        &self,
        operation: &'static str,
        primary: P,
        fallback: F,
    ) -> Result<T>
    where
        E: Entity,
        P: Future<Output = Result<T>> + Send,
        F: FnOnce() -> Result<T> + Send,
    {
        if self.is_using_in_memory_fallback() {
            return fallback();
        }

        match primary.await {
            Err(err) if err.is_store_failure() => {
                warn!(
                    entity = E::DESCRIPTOR.name,
                    operation,
                    error = %err,
                    "Database operation failed, falling back to in-memory store"
                );
                self.enter_fallback();
                fallback()
            }
            result => result,
        }
    }

    fn enter_fallback(&self) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            info!("Switched to in-memory store until restart");
        }
    }
}

fn decoded<E: Entity>(mut record: E) -> E {
    decode_record(&mut record);
    record
}
