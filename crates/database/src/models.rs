//! Database models.
//!
//! JSON uses camelCase field names; columns use snake_case. Enum-like fields
//! are plain strings so that token and display forms can both be carried.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Timestamps and attribution shared by every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
    /// Who created the record.
    pub created_by: String,
    /// Who last updated the record.
    pub updated_by: String,
}

impl Audit {
    /// Audit block for a record created at `now` by `actor`.
    pub fn new(now: DateTime<Utc>, actor: &str) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        }
    }
}

/// A company profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub account_name: String,
    /// Rating tier (e.g., "Gold (High Priority)").
    pub account_rating: Option<String>,
    pub account_owner: Option<String>,
    pub status: Option<String>,
    pub industry: Option<String>,
    /// Revenue band (e.g., "$10M - $50M").
    pub revenue: Option<String>,
    /// Headcount band (e.g., "100-500").
    pub number_of_employees: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_post_code: Option<String>,
    pub time_zone: Option<String>,
    pub website: Option<String>,
    /// Sales geography (e.g., "Americas").
    pub geo: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
}

/// A person, usually linked to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    /// Account ID.
    pub associated_account: Option<String>,
    pub email_address: Option<String>,
    pub desk_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub time_zone: Option<String>,
    pub source: Option<String>,
    pub owner: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
}

/// A sales opportunity tied to an account and a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDeal {
    pub id: String,
    pub deal_name: String,
    pub deal_owner: Option<String>,
    pub business_line: Option<String>,
    /// Account ID.
    pub associated_account: Option<String>,
    /// Contact ID.
    pub associated_contact: Option<String>,
    /// Monetary value, kept as entered (e.g., "150000").
    pub deal_value: Option<String>,
    pub stage: Option<String>,
    /// Win probability as entered (e.g., "75%").
    pub probability: Option<String>,
    pub description: Option<String>,
    pub geo: Option<String>,
    /// Contracting legal entity.
    pub entity: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
}

/// An unqualified prospect, not yet linked to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lead_source: Option<String>,
    pub status: Option<String>,
    pub rating: Option<String>,
    pub owner: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
}

/// A timestamped interaction with an account or contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    /// Call, Email, Meeting, ...
    pub activity_type: String,
    /// When the interaction happened. Defaults to the time of creation.
    #[serde(default = "Utc::now")]
    pub date_time: DateTime<Utc>,
    pub summary: String,
    pub outcome_disposition: Option<String>,
    pub associated_account: Option<String>,
    pub associated_contact: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
}

/// Operator role.
///
/// JSON uses lower case; the database column holds `ADMIN` or `USER`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Role {
    #[serde(alias = "ADMIN", alias = "Admin")]
    Admin,
    #[default]
    #[serde(alias = "USER", alias = "User")]
    User,
}

impl Role {
    /// Parse a role name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Lower-case name used in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// An internal operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
}

impl UserProfile {
    /// First and last name joined for display.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Pagination block returned with every list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Matching records across all pages.
    pub total: u64,
    /// `ceil(total / limit)`.
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };

        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// One page of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, query: &ListQuery, total: u64) -> Self {
        Self {
            data,
            pagination: Pagination::new(query.page, query.limit, total),
        }
    }
}

/// Page selection and optional search term for list operations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Case-insensitive substring matched against the kind's search fields.
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// The search term, if one was given and is not blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[cfg(test)]
impl Contact {
    /// Minimal contact for tests.
    pub fn sample(id: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            title: None,
            associated_account: None,
            email_address: None,
            desk_phone: None,
            mobile_phone: None,
            city: None,
            state: None,
            country: None,
            time_zone: None,
            source: None,
            owner: None,
            status: None,
            audit: Audit::new(Utc::now(), "system"),
        }
    }
}
