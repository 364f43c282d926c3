//! SQLite implementation of [`RelationalStore`].
//!
//! Table and column names come from each kind's static descriptor, so the
//! statements are assembled with string formatting; values are always bound.

use async_trait::async_trait;

use crate::entity::{Entity, EntityDescriptor};
use crate::error::{DatabaseError, Result};
use crate::store::RelationalStore;
use crate::Database;

const AUDIT_COLUMNS: &str = "created_at, updated_at, created_by, updated_by";

fn select_columns(d: &EntityDescriptor) -> String {
    format!("id, {}, {}", d.columns.join(", "), AUDIT_COLUMNS)
}

/// `WHERE` clause matching the search columns, one placeholder per column.
fn search_clause(d: &EntityDescriptor, search: Option<&str>) -> String {
    if search.is_none() {
        return String::new();
    }

    let predicates: Vec<String> = d
        .search_columns
        .iter()
        .map(|column| format!(r"LOWER({}) LIKE ? ESCAPE '\'", column))
        .collect();

    format!("WHERE ({})", predicates.join(" OR "))
}

/// `%term%` with LIKE wildcards in the term escaped.
///
/// `LOWER` only folds ASCII, so the term is folded the same way.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_ascii_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn map_write_error<E: Entity>(record: &E, err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return DatabaseError::AlreadyExists {
                entity: E::DESCRIPTOR.name,
                id: record.id().to_string(),
            };
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl RelationalStore for Database {
    async fn count<E: Entity>(&self, search: Option<&str>) -> Result<u64> {
        let d = E::DESCRIPTOR;
        let sql = format!(
            "SELECT COUNT(*) FROM {} {}",
            d.table,
            search_clause(&d, search)
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(term) = search {
            let pattern = like_pattern(term);
            for _ in d.search_columns {
                query = query.bind(pattern.clone());
            }
        }

        let count = query.fetch_one(self.pool()).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn find_many<E: Entity>(
        &self,
        search: Option<&str>,
        skip: u64,
        take: u32,
    ) -> Result<Vec<E>> {
        let d = E::DESCRIPTOR;
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY {} DESC, rowid DESC LIMIT ? OFFSET ?",
            select_columns(&d),
            d.table,
            search_clause(&d, search),
            d.order_column
        );

        let mut query = sqlx::query_as::<_, E>(&sql);
        if let Some(term) = search {
            let pattern = like_pattern(term);
            for _ in d.search_columns {
                query = query.bind(pattern.clone());
            }
        }

        let rows = query
            .bind(i64::from(take))
            .bind(i64::try_from(skip).unwrap_or(i64::MAX))
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    async fn find_unique<E: Entity>(&self, id: &str) -> Result<Option<E>> {
        let d = E::DESCRIPTOR;
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            select_columns(&d),
            d.table
        );

        let record = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(record)
    }

    async fn create<E: Entity>(&self, record: &E) -> Result<E> {
        let d = E::DESCRIPTOR;
        let placeholders = vec!["?"; d.columns.len() + 5].join(", ");
        let sql = format!(
            "INSERT INTO {} (id, {}, {}) VALUES ({}) RETURNING {}",
            d.table,
            d.columns.join(", "),
            AUDIT_COLUMNS,
            placeholders,
            select_columns(&d)
        );

        let audit = record.audit();
        let query = sqlx::query_as::<_, E>(&sql).bind(record.id());
        record
            .bind_columns(query)
            .bind(audit.created_at)
            .bind(audit.updated_at)
            .bind(&audit.created_by)
            .bind(&audit.updated_by)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_write_error(record, e))
    }

    async fn update<E: Entity>(&self, record: &E, columns: &[&str]) -> Result<Option<E>> {
        let d = E::DESCRIPTOR;
        let n = d.columns.len();

        // Values bind as ?1..?n, then stamp, actor and id, then one
        // "write this column" flag per column.
        let assignments: Vec<String> = d
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                format!(
                    "{column} = CASE WHEN ?{flag} THEN ?{value} ELSE {column} END",
                    column = column,
                    flag = n + 4 + i,
                    value = i + 1
                )
            })
            .collect();
        let sql = format!(
            "UPDATE {} SET {}, updated_at = ?{}, updated_by = ?{} WHERE id = ?{} RETURNING {}",
            d.table,
            assignments.join(", "),
            n + 1,
            n + 2,
            n + 3,
            select_columns(&d)
        );

        let audit = record.audit();
        let mut query = record
            .bind_columns(sqlx::query_as::<_, E>(&sql))
            .bind(audit.updated_at)
            .bind(&audit.updated_by)
            .bind(record.id());
        for column in d.columns {
            query = query.bind(columns.contains(column));
        }

        query
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_write_error(record, e))
    }

    async fn delete<E: Entity>(&self, id: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", E::DESCRIPTOR.table);

        let result = sqlx::query(&sql).bind(id).execute(self.pool()).await?;

        Ok(result.rows_affected() > 0)
    }
}
