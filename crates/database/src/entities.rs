//! [`Entity`] implementations for the CRM record types.

use chrono::{DateTime, Utc};

use crate::entity::{Entity, EntityDescriptor, SqliteQueryAs};
use crate::memory::Collections;
use crate::models::{Account, ActiveDeal, ActivityLog, Audit, Contact, Lead, UserProfile};
use crate::validation::{
    require_text, validate_email, validate_optional_email, ValidationError,
};

impl Entity for Account {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        name: "Account",
        table: "accounts",
        id_prefix: "acc",
        columns: &[
            "account_name",
            "account_rating",
            "account_owner",
            "status",
            "industry",
            "revenue",
            "number_of_employees",
            "address_line1",
            "address_line2",
            "city",
            "state",
            "country",
            "zip_post_code",
            "time_zone",
            "website",
            "geo",
        ],
        search_columns: &["account_name", "industry"],
        order_column: "created_at",
    };

    fn id(&self) -> &str {
        &self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn enum_fields_mut(&mut self) -> Vec<&mut String> {
        [
            self.account_rating.as_mut(),
            self.status.as_mut(),
            self.geo.as_mut(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn search_values(&self) -> Vec<&str> {
        vec![self.account_name.as_str(), self.industry.as_deref().unwrap_or_default()]
    }

    fn bind_columns<'q>(&'q self, query: SqliteQueryAs<'q, Self>) -> SqliteQueryAs<'q, Self> {
        query
            .bind(&self.account_name)
            .bind(&self.account_rating)
            .bind(&self.account_owner)
            .bind(&self.status)
            .bind(&self.industry)
            .bind(&self.revenue)
            .bind(&self.number_of_employees)
            .bind(&self.address_line1)
            .bind(&self.address_line2)
            .bind(&self.city)
            .bind(&self.state)
            .bind(&self.country)
            .bind(&self.zip_post_code)
            .bind(&self.time_zone)
            .bind(&self.website)
            .bind(&self.geo)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("accountName", &self.account_name)
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.accounts
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.accounts
    }
}

impl Entity for Contact {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        name: "Contact",
        table: "contacts",
        id_prefix: "cnt",
        columns: &[
            "first_name",
            "last_name",
            "title",
            "associated_account",
            "email_address",
            "desk_phone",
            "mobile_phone",
            "city",
            "state",
            "country",
            "time_zone",
            "source",
            "owner",
            "status",
        ],
        search_columns: &["first_name", "last_name", "email_address"],
        order_column: "created_at",
    };

    fn id(&self) -> &str {
        &self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn enum_fields_mut(&mut self) -> Vec<&mut String> {
        [self.source.as_mut(), self.status.as_mut()]
            .into_iter()
            .flatten()
            .collect()
    }

    fn search_values(&self) -> Vec<&str> {
        vec![
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email_address.as_deref().unwrap_or_default(),
        ]
    }

    fn bind_columns<'q>(&'q self, query: SqliteQueryAs<'q, Self>) -> SqliteQueryAs<'q, Self> {
        query
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(&self.title)
            .bind(&self.associated_account)
            .bind(&self.email_address)
            .bind(&self.desk_phone)
            .bind(&self.mobile_phone)
            .bind(&self.city)
            .bind(&self.state)
            .bind(&self.country)
            .bind(&self.time_zone)
            .bind(&self.source)
            .bind(&self.owner)
            .bind(&self.status)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        validate_optional_email(self.email_address.as_deref())
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.contacts
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.contacts
    }
}

impl Entity for ActiveDeal {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        name: "Deal",
        table: "active_deals",
        id_prefix: "deal",
        columns: &[
            "deal_name",
            "deal_owner",
            "business_line",
            "associated_account",
            "associated_contact",
            "deal_value",
            "stage",
            "probability",
            "description",
            "geo",
            "entity",
        ],
        search_columns: &["deal_name", "deal_owner"],
        order_column: "created_at",
    };

    fn id(&self) -> &str {
        &self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn enum_fields_mut(&mut self) -> Vec<&mut String> {
        [
            self.business_line.as_mut(),
            self.stage.as_mut(),
            self.geo.as_mut(),
            self.entity.as_mut(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn search_values(&self) -> Vec<&str> {
        vec![self.deal_name.as_str(), self.deal_owner.as_deref().unwrap_or_default()]
    }

    fn bind_columns<'q>(&'q self, query: SqliteQueryAs<'q, Self>) -> SqliteQueryAs<'q, Self> {
        query
            .bind(&self.deal_name)
            .bind(&self.deal_owner)
            .bind(&self.business_line)
            .bind(&self.associated_account)
            .bind(&self.associated_contact)
            .bind(&self.deal_value)
            .bind(&self.stage)
            .bind(&self.probability)
            .bind(&self.description)
            .bind(&self.geo)
            .bind(&self.entity)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("dealName", &self.deal_name)
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.deals
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.deals
    }
}

impl Entity for Lead {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        name: "Lead",
        table: "leads",
        id_prefix: "lead",
        columns: &[
            "first_name",
            "last_name",
            "company",
            "title",
            "email",
            "phone",
            "lead_source",
            "status",
            "rating",
            "owner",
        ],
        search_columns: &["first_name", "last_name", "company", "email"],
        order_column: "created_at",
    };

    fn id(&self) -> &str {
        &self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn enum_fields_mut(&mut self) -> Vec<&mut String> {
        [
            self.lead_source.as_mut(),
            self.status.as_mut(),
            self.rating.as_mut(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn search_values(&self) -> Vec<&str> {
        vec![
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.company.as_deref().unwrap_or_default(),
            self.email.as_deref().unwrap_or_default(),
        ]
    }

    fn bind_columns<'q>(&'q self, query: SqliteQueryAs<'q, Self>) -> SqliteQueryAs<'q, Self> {
        query
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(&self.company)
            .bind(&self.title)
            .bind(&self.email)
            .bind(&self.phone)
            .bind(&self.lead_source)
            .bind(&self.status)
            .bind(&self.rating)
            .bind(&self.owner)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        validate_optional_email(self.email.as_deref())
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.leads
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.leads
    }
}

impl Entity for ActivityLog {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        name: "Activity",
        table: "activity_logs",
        id_prefix: "act",
        columns: &[
            "activity_type",
            "date_time",
            "summary",
            "outcome_disposition",
            "associated_account",
            "associated_contact",
        ],
        search_columns: &["summary"],
        order_column: "date_time",
    };

    fn id(&self) -> &str {
        &self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.date_time
    }

    fn enum_fields_mut(&mut self) -> Vec<&mut String> {
        [Some(&mut self.activity_type), self.outcome_disposition.as_mut()]
            .into_iter()
            .flatten()
            .collect()
    }

    fn search_values(&self) -> Vec<&str> {
        vec![self.summary.as_str()]
    }

    fn bind_columns<'q>(&'q self, query: SqliteQueryAs<'q, Self>) -> SqliteQueryAs<'q, Self> {
        query
            .bind(&self.activity_type)
            .bind(self.date_time)
            .bind(&self.summary)
            .bind(&self.outcome_disposition)
            .bind(&self.associated_account)
            .bind(&self.associated_contact)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("activityType", &self.activity_type)?;
        if self.summary.trim().is_empty() {
            return Err(ValidationError::Empty("summary".to_string()));
        }
        Ok(())
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.activities
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.activities
    }
}

impl Entity for UserProfile {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        name: "User",
        table: "user_profiles",
        id_prefix: "usr",
        columns: &[
            "first_name",
            "last_name",
            "email",
            "phone",
            "department",
            "role",
        ],
        search_columns: &["first_name", "last_name", "email"],
        order_column: "created_at",
    };

    fn id(&self) -> &str {
        &self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    // Role is typed and converted by its own encoding.
    fn enum_fields_mut(&mut self) -> Vec<&mut String> {
        Vec::new()
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_ascii_lowercase())
    }

    fn search_values(&self) -> Vec<&str> {
        vec![self.first_name.as_str(), self.last_name.as_str(), self.email.as_str()]
    }

    fn bind_columns<'q>(&'q self, query: SqliteQueryAs<'q, Self>) -> SqliteQueryAs<'q, Self> {
        query
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(&self.email)
            .bind(&self.phone)
            .bind(&self.department)
            .bind(self.role)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("firstName", &self.first_name)?;
        validate_email(&self.email)
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.user_profiles
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.user_profiles
    }
}
