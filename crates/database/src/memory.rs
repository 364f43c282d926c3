//! Process-local store used when the relational store is unreachable.
//!
//! Collections are seeded with sample data on first use and are lost on
//! restart. All operations are synchronous: the lock is taken for the whole
//! body of an operation, so a mutation is never observed half-applied.

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use tracing::info;

use crate::entity::{build_record, merge_patch, Entity, Fields};
use crate::models::{
    Account, ActiveDeal, ActivityLog, Contact, Lead, ListQuery, Page, UserProfile,
};
use crate::error::{DatabaseError, Result};
use crate::seed;

/// Per-kind record collections, in insertion order.
#[derive(Debug, Default)]
pub struct Collections {
    initialized: bool,
    pub(crate) accounts: Vec<Account>,
    pub(crate) contacts: Vec<Contact>,
    pub(crate) deals: Vec<ActiveDeal>,
    pub(crate) leads: Vec<Lead>,
    pub(crate) activities: Vec<ActivityLog>,
    pub(crate) user_profiles: Vec<UserProfile>,
}

/// In-memory substitute for the relational store.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    collections: Mutex<Collections>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collections. Only the first call has any effect.
    pub fn initialize(&self) {
        self.with_collections(|_| ());
    }

    /// List one page of records, newest first, optionally filtered.
    pub fn list<E: Entity>(&self, query: &ListQuery) -> Page<E> {
        // ASCII folding, matching the relational store's `LOWER`.
        let needle = query.search_term().map(str::to_ascii_lowercase);

        self.with_collections(|collections| {
            // Reverse insertion order breaks ties between equal sort keys.
            let mut matched: Vec<&E> = E::collection(collections)
                .iter()
                .rev()
                .filter(|record| match &needle {
                    Some(needle) => record
                        .search_values()
                        .iter()
                        .any(|value| value.to_ascii_lowercase().contains(needle.as_str())),
                    None => true,
                })
                .collect();
            matched.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));

            let total = matched.len() as u64;
            let data = matched
                .into_iter()
                .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
                .take(query.limit as usize)
                .cloned()
                .collect();

            Page::new(data, query, total)
        })
    }

    /// Get a record by ID.
    pub fn get<E: Entity>(&self, id: &str) -> Option<E> {
        self.with_collections(|collections| {
            E::collection(collections)
                .iter()
                .find(|record| record.id() == id)
                .cloned()
        })
    }

    /// Create a record with a fresh ID and audit stamps.
    ///
    /// Fails with [`DatabaseError::AlreadyExists`] if another record has the
    /// same unique key.
    pub fn create<E: Entity>(&self, fields: Fields) -> Result<E> {
        self.with_collections(|collections| {
            let record: E = build_record(fields, E::DESCRIPTOR.new_id(), Utc::now())?;
            let records = E::collection_mut(collections);
            check_unique(records, &record)?;
            records.push(record.clone());
            Ok(record)
        })
    }

    /// Merge `patch` onto a record. Returns `None` if the ID is unknown.
    pub fn update<E: Entity>(&self, id: &str, patch: Fields) -> Result<Option<E>> {
        self.with_collections(|collections| {
            let records = E::collection_mut(collections);
            let Some(index) = records.iter().position(|record| record.id() == id) else {
                return Ok(None);
            };

            let updated: E = merge_patch(&records[index], patch, Utc::now())?;
            check_unique(records, &updated)?;
            records[index] = updated.clone();
            Ok(Some(updated))
        })
    }

    /// Delete a record. Returns false if the ID is unknown.
    pub fn delete<E: Entity>(&self, id: &str) -> bool {
        self.with_collections(|collections| {
            let records = E::collection_mut(collections);
            match records.iter().position(|record| record.id() == id) {
                Some(index) => {
                    records.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Number of stored records of one kind.
    pub fn len<E: Entity>(&self) -> usize {
        self.with_collections(|collections| E::collection(collections).len())
    }

    fn with_collections<R>(&self, f: impl FnOnce(&mut Collections) -> R) -> R {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !collections.initialized {
            seed::populate(&mut collections);
            collections.initialized = true;
            info!(
                accounts = collections.accounts.len(),
                contacts = collections.contacts.len(),
                deals = collections.deals.len(),
                leads = collections.leads.len(),
                activities = collections.activities.len(),
                users = collections.user_profiles.len(),
                "In-memory database initialized with sample data"
            );
        }

        f(&mut collections)
    }
}

/// Reject `candidate` if a different record already holds its unique key.
fn check_unique<E: Entity>(records: &[E], candidate: &E) -> Result<()> {
    let Some(key) = candidate.unique_key() else {
        return Ok(());
    };

    let taken = records
        .iter()
        .any(|record| record.id() != candidate.id() && record.unique_key().as_ref() == Some(&key));
    if taken {
        return Err(DatabaseError::AlreadyExists {
            entity: E::DESCRIPTOR.name,
            id: candidate.id().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = InMemoryDatabase::new();
        db.initialize();
        db.initialize();
        assert_eq!(db.len::<Account>(), 2);
        assert_eq!(db.len::<Contact>(), 2);
        assert_eq!(db.len::<ActiveDeal>(), 2);
        assert_eq!(db.len::<Lead>(), 1);
        assert_eq!(db.len::<ActivityLog>(), 1);
        assert_eq!(db.len::<UserProfile>(), 2);
    }

    #[test]
    fn test_seeded_accounts_paginate() {
        let db = InMemoryDatabase::new();
        let page = db.list::<Account>(&ListQuery::new(1, 1));

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.limit, 1);
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.total_pages, 2);

        let second = db.list::<Account>(&ListQuery::new(2, 1));
        assert_eq!(second.data.len(), 1);
        assert_ne!(page.data[0].id, second.data[0].id);

        let beyond = db.list::<Account>(&ListQuery::new(3, 1));
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.pagination.total, 2);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let db = InMemoryDatabase::new();

        let page = db.list::<Contact>(&ListQuery::default().with_search("smith"));
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.data[0].first_name, "John");

        let by_email = db.list::<Contact>(&ListQuery::default().with_search("INNOVATE.COM"));
        assert_eq!(by_email.data.len(), 1);
        assert_eq!(by_email.data[0].last_name, "Doe");

        let none = db.list::<Contact>(&ListQuery::default().with_search("zzz"));
        assert!(none.data.is_empty());
        assert_eq!(none.pagination.total, 0);
        assert_eq!(none.pagination.total_pages, 0);
    }

    #[test]
    fn test_search_folds_ascii_only() {
        let db = InMemoryDatabase::new();
        db.create::<Contact>(fields(json!({ "firstName": "Émile", "lastName": "Zola" })))
            .unwrap();

        let search = |term: &str| {
            db.list::<Contact>(&ListQuery::default().with_search(term))
                .pagination
                .total
        };
        assert_eq!(search("ZOLA"), 1);
        assert_eq!(search("ÉMILE"), 1);
        assert_eq!(search("émile"), 0);
    }

    #[test]
    fn test_search_applies_before_pagination() {
        let db = InMemoryDatabase::new();
        for name in ["Acme One", "Acme Two", "Acme Three"] {
            db.create::<Account>(fields(json!({ "accountName": name })))
                .unwrap();
        }

        let page = db.list::<Account>(&ListQuery::new(2, 2).with_search("acme"));
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.data.len(), 1);
    }

    #[test]
    fn test_created_records_list_first() {
        let db = InMemoryDatabase::new();
        let created = db
            .create::<Account>(fields(json!({ "accountName": "Newest Ltd" })))
            .unwrap();

        let page = db.list::<Account>(&ListQuery::default());
        assert_eq!(page.data[0].id, created.id);
        assert_eq!(page.pagination.total, 3);
    }

    #[test]
    fn test_create_get_update_delete() {
        let db = InMemoryDatabase::new();

        let contact = db
            .create::<Contact>(fields(json!({
                "firstName": "Grace",
                "lastName": "Hopper",
                "status": "Prospect"
            })))
            .unwrap();
        assert!(contact.id.starts_with("cnt"));
        assert_eq!(contact.audit.created_by, "system");

        let fetched = db.get::<Contact>(&contact.id).unwrap();
        assert_eq!(fetched, contact);

        let updated = db
            .update::<Contact>(&contact.id, fields(json!({ "title": "Admiral" })))
            .unwrap()
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Admiral"));
        assert_eq!(updated.audit.created_at, contact.audit.created_at);
        assert!(updated.audit.updated_at >= contact.audit.updated_at);
        assert_eq!(db.get::<Contact>(&contact.id).unwrap(), updated);

        assert!(db.delete::<Contact>(&contact.id));
        assert!(db.get::<Contact>(&contact.id).is_none());
        assert!(!db.delete::<Contact>(&contact.id));
    }

    #[test]
    fn test_not_found_results() {
        let db = InMemoryDatabase::new();
        assert!(db.get::<Lead>("missing").is_none());
        assert!(db
            .update::<Lead>("missing", fields(json!({ "status": "Hot" })))
            .unwrap()
            .is_none());
        assert!(!db.delete::<Lead>("missing"));
    }

    #[test]
    fn test_invalid_create_leaves_store_untouched() {
        let db = InMemoryDatabase::new();
        let result = db.create::<Lead>(fields(json!({ "firstName": "NoLast" })));
        assert!(result.is_err());
        assert_eq!(db.len::<Lead>(), 1);
    }

    #[test]
    fn test_unique_key_rejects_duplicates() {
        let db = InMemoryDatabase::new();

        let err = db
            .create::<UserProfile>(fields(json!({
                "firstName": "Copy",
                "email": seed::SYSTEM_ADMIN_EMAIL.to_uppercase()
            })))
            .unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists { entity: "User", .. }));
        assert_eq!(db.len::<UserProfile>(), 2);

        let err = db
            .update::<UserProfile>("usr2", fields(json!({ "email": seed::SYSTEM_ADMIN_EMAIL })))
            .unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists { .. }));

        // Re-saving a record with its own key is fine.
        let own = db.get::<UserProfile>("usr1").unwrap().email;
        assert!(db
            .update::<UserProfile>("usr1", fields(json!({ "email": own })))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_parallel_creates_admit_one_per_key() {
        let db = InMemoryDatabase::new();

        let created = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|i| {
                    let db = &db;
                    scope.spawn(move || {
                        db.create::<UserProfile>(fields(json!({
                            "firstName": format!("Worker {}", i),
                            "email": "race@yitro.com"
                        })))
                        .is_ok()
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(created, 1);
        assert_eq!(db.len::<UserProfile>(), 3);
    }

    #[test]
    fn test_parallel_updates_to_one_record_all_land() {
        let db = InMemoryDatabase::new();
        let patches = [
            json!({ "company": "StartupCorp" }),
            json!({ "phone": "+1-555-0200" }),
            json!({ "title": "CTO" }),
            json!({ "owner": "Sarah Wilson" }),
        ];

        std::thread::scope(|scope| {
            for patch in &patches {
                let db = &db;
                scope.spawn(move || {
                    db.update::<Lead>("lead1", fields(patch.clone()))
                        .unwrap()
                        .unwrap();
                });
            }
        });

        let lead = db.get::<Lead>("lead1").unwrap();
        assert_eq!(lead.company.as_deref(), Some("StartupCorp"));
        assert_eq!(lead.phone.as_deref(), Some("+1-555-0200"));
        assert_eq!(lead.title.as_deref(), Some("CTO"));
        assert_eq!(lead.owner.as_deref(), Some("Sarah Wilson"));
    }

    #[test]
    fn test_activities_order_by_date_time() {
        let db = InMemoryDatabase::new();
        let older = db
            .create::<ActivityLog>(fields(json!({
                "activityType": "Email",
                "summary": "Old follow-up",
                "dateTime": "2023-06-01T09:00:00Z"
            })))
            .unwrap();

        let page = db.list::<ActivityLog>(&ListQuery::default());
        assert_eq!(page.data.len(), 2);
        // Seed activity is dated 2024-01-07 and sorts ahead of the older one.
        assert_eq!(page.data[1].id, older.id);
    }
}
