//! Entity kinds and the metadata both stores need to handle them generically.
//!
//! Every record type implements [`Entity`]; its [`EntityDescriptor`] names
//! the table, the writable columns (in bind order), the columns searched by
//! list operations and the column lists are ordered by.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::query::QueryAs;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite};

use crate::memory::Collections;
use crate::models::Audit;
use crate::validation::ValidationError;

/// Untyped JSON fields used for create payloads and update patches.
pub type Fields = Map<String, Value>;

/// `query_as` builder for a given entity.
pub type SqliteQueryAs<'q, E> = QueryAs<'q, Sqlite, E, SqliteArguments<'q>>;

/// Attribution recorded on records written through this crate.
pub const SYSTEM_ACTOR: &str = "system";

/// Keys a caller can never set directly.
const PROTECTED_KEYS: [&str; 5] = ["id", "createdAt", "updatedAt", "createdBy", "updatedBy"];

/// Static description of one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    /// Display name used in messages and logs (e.g., "Contact").
    pub name: &'static str,
    /// Relational table.
    pub table: &'static str,
    /// Prefix for generated identifiers.
    pub id_prefix: &'static str,
    /// Writable columns, excluding `id` and audit columns, in bind order.
    pub columns: &'static [&'static str],
    /// Columns matched by a search term.
    pub search_columns: &'static [&'static str],
    /// Lists are ordered by this column, newest first.
    pub order_column: &'static str,
}

impl EntityDescriptor {
    /// Generate a fresh identifier for this kind.
    pub fn new_id(&self) -> String {
        format!("{}{}", self.id_prefix, uuid::Uuid::new_v4().simple())
    }

    /// Writable columns whose field is set in `patch`, in descriptor order.
    pub fn patched_columns(&self, patch: &Fields) -> Vec<&'static str> {
        self.columns
            .iter()
            .copied()
            .filter(|column| patch.contains_key(&field_name(column)))
            .collect()
    }
}

/// JSON field name of a column (`zip_post_code` is `zipPostCode`).
pub fn field_name(column: &str) -> String {
    let mut name = String::with_capacity(column.len());
    let mut upper = false;
    for c in column.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            name.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// A record type stored by both the relational and the in-memory store.
pub trait Entity:
    Serialize
    + DeserializeOwned
    + Clone
    + std::fmt::Debug
    + Send
    + Sync
    + Unpin
    + for<'r> FromRow<'r, SqliteRow>
    + 'static
{
    const DESCRIPTOR: EntityDescriptor;

    fn id(&self) -> &str;

    fn audit(&self) -> &Audit;

    /// Timestamp lists are ordered by. Must agree with `order_column`.
    fn sort_key(&self) -> DateTime<Utc> {
        self.audit().created_at
    }

    /// Enum-like fields that are stored in token form.
    fn enum_fields_mut(&mut self) -> Vec<&mut String>;

    /// Key that must be unique within the kind, if any.
    ///
    /// The in-memory store enforces it; the relational schema carries a
    /// matching unique index.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Values of the search columns, in the same order.
    fn search_values(&self) -> Vec<&str>;

    /// Bind the writable columns in `DESCRIPTOR.columns` order.
    fn bind_columns<'q>(&'q self, query: SqliteQueryAs<'q, Self>) -> SqliteQueryAs<'q, Self>;

    /// Check required fields and formats.
    fn validate(&self) -> Result<(), ValidationError>;

    fn collection(collections: &Collections) -> &Vec<Self>;

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self>;
}

/// Build a new record from caller-supplied fields.
///
/// Protected keys in `fields` are ignored; `id` and the audit block are
/// stamped here. Fails if the fields do not form a valid record.
pub fn build_record<E: Entity>(
    mut fields: Fields,
    id: String,
    now: DateTime<Utc>,
) -> Result<E, ValidationError> {
    strip_protected(&mut fields);

    let stamp = Value::String(now.to_rfc3339());
    fields.insert("id".to_string(), Value::String(id));
    fields.insert("createdAt".to_string(), stamp.clone());
    fields.insert("updatedAt".to_string(), stamp);
    fields.insert("createdBy".to_string(), Value::String(SYSTEM_ACTOR.to_string()));
    fields.insert("updatedBy".to_string(), Value::String(SYSTEM_ACTOR.to_string()));

    let record: E = serde_json::from_value(Value::Object(fields)).map_err(malformed::<E>)?;
    record.validate()?;
    Ok(record)
}

/// Merge a patch onto an existing record and refresh `updatedAt`.
pub fn merge_patch<E: Entity>(
    existing: &E,
    mut patch: Fields,
    now: DateTime<Utc>,
) -> Result<E, ValidationError> {
    strip_protected(&mut patch);

    let mut current = match serde_json::to_value(existing).map_err(malformed::<E>)? {
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::Malformed {
                entity: E::DESCRIPTOR.name,
                reason: format!("expected an object, found {}", other),
            })
        }
    };

    current.extend(patch);
    current.insert("updatedAt".to_string(), Value::String(now.to_rfc3339()));

    let record: E = serde_json::from_value(Value::Object(current)).map_err(malformed::<E>)?;
    record.validate()?;
    Ok(record)
}

fn strip_protected(fields: &mut Fields) {
    for key in PROTECTED_KEYS {
        fields.remove(key);
    }
}

fn malformed<E: Entity>(err: serde_json::Error) -> ValidationError {
    ValidationError::Malformed {
        entity: E::DESCRIPTOR.name,
        reason: err.to_string(),
    }
}
