//! Sample records for the in-memory store.

use chrono::{TimeZone, Utc};

use crate::entity::SYSTEM_ACTOR;
use crate::memory::Collections;
use crate::models::{
    Account, ActiveDeal, ActivityLog, Audit, Contact, Lead, Role, UserProfile,
};

/// Email of the built-in administrator account.
pub const SYSTEM_ADMIN_EMAIL: &str = "admin@yitro.com";

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

pub(crate) fn populate(collections: &mut Collections) {
    let audit = Audit::new(Utc::now(), SYSTEM_ACTOR);

    collections.accounts = vec![
        Account {
            id: "acc1".to_string(),
            account_name: "TechCorp Solutions".to_string(),
            account_rating: text("Gold (High Priority)"),
            account_owner: text("Sales Rep 1"),
            status: text("Prospect"),
            industry: text("Technology"),
            revenue: text("$10M - $50M"),
            number_of_employees: text("100-500"),
            address_line1: text("123 Tech Street"),
            address_line2: None,
            city: text("New York"),
            state: text("NY"),
            country: text("USA"),
            zip_post_code: text("10001"),
            time_zone: text("EST"),
            website: text("https://techcorp.com"),
            geo: text("Americas"),
            audit: audit.clone(),
        },
        Account {
            id: "acc2".to_string(),
            account_name: "Innovate Inc".to_string(),
            account_rating: text("Platinum (Must Have)"),
            account_owner: text("Sales Rep 2"),
            status: text("Active Deal"),
            industry: text("Software"),
            revenue: text("$50M+"),
            number_of_employees: text("500+"),
            address_line1: text("456 Innovation Ave"),
            address_line2: None,
            city: text("San Francisco"),
            state: text("CA"),
            country: text("USA"),
            zip_post_code: text("94105"),
            time_zone: text("PST"),
            website: text("https://innovate.com"),
            geo: text("Americas"),
            audit: audit.clone(),
        },
    ];

    collections.contacts = vec![
        Contact {
            id: "cnt1".to_string(),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            title: text("CEO"),
            associated_account: text("acc1"),
            email_address: text("john.smith@techcorp.com"),
            desk_phone: text("+1-555-0123"),
            mobile_phone: text("+1-555-0124"),
            city: text("New York"),
            state: text("NY"),
            country: text("USA"),
            time_zone: text("EST"),
            source: text("Data Research"),
            owner: text("Sales Rep 1"),
            status: text("Prospect"),
            audit: audit.clone(),
        },
        Contact {
            id: "cnt2".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            title: text("CTO"),
            associated_account: text("acc2"),
            email_address: text("jane.doe@innovate.com"),
            desk_phone: text("+1-555-0125"),
            mobile_phone: text("+1-555-0126"),
            city: text("San Francisco"),
            state: text("CA"),
            country: text("USA"),
            time_zone: text("PST"),
            source: text("Referral"),
            owner: text("Sales Rep 2"),
            status: text("Active Deal"),
            audit: audit.clone(),
        },
    ];

    collections.deals = vec![
        ActiveDeal {
            id: "deal1".to_string(),
            deal_name: "TechCorp Automation Project".to_string(),
            deal_owner: text("Sales Rep 1"),
            business_line: text("Automation"),
            associated_account: text("acc1"),
            associated_contact: text("cnt1"),
            deal_value: text("150000"),
            stage: text("Proposal Submitted"),
            probability: text("75%"),
            description: text("Large automation project for TechCorp"),
            geo: text("Americas"),
            entity: text("Yitro Global"),
            audit: audit.clone(),
        },
        ActiveDeal {
            id: "deal2".to_string(),
            deal_name: "Innovate Software Development".to_string(),
            deal_owner: text("Sales Rep 2"),
            business_line: text("Product"),
            associated_account: text("acc2"),
            associated_contact: text("cnt2"),
            deal_value: text("250000"),
            stage: text("Negotiating"),
            probability: text("90%"),
            description: text("Custom software development for Innovate Inc"),
            geo: text("Americas"),
            entity: text("Yitro Tech"),
            audit: audit.clone(),
        },
    ];

    collections.leads = vec![Lead {
        id: "lead1".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Johnson".to_string(),
        company: text("StartupCorp"),
        title: text("Founder"),
        email: text("alice@startupcorp.com"),
        phone: text("+1-555-0200"),
        lead_source: text("Website"),
        status: text("New"),
        rating: text("Hot"),
        owner: text("Sales Rep 1"),
        audit: audit.clone(),
    }];

    collections.activities = vec![ActivityLog {
        id: "act1".to_string(),
        activity_type: "Call".to_string(),
        date_time: Utc
            .with_ymd_and_hms(2024, 1, 7, 10, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
        summary: "Initial discovery call with TechCorp. Discussed automation needs."
            .to_string(),
        outcome_disposition: text("Meeting Completed"),
        associated_account: text("acc1"),
        associated_contact: text("cnt1"),
        audit: audit.clone(),
    }];

    collections.user_profiles = vec![
        UserProfile {
            id: "usr1".to_string(),
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            email: SYSTEM_ADMIN_EMAIL.to_string(),
            phone: text("+1-555-0100"),
            department: text("Administration"),
            role: Role::Admin,
            audit: audit.clone(),
        },
        UserProfile {
            id: "usr2".to_string(),
            first_name: "Sales".to_string(),
            last_name: "Representative".to_string(),
            email: "sales@yitro.com".to_string(),
            phone: text("+1-555-0101"),
            department: text("Sales"),
            role: Role::User,
            audit,
        },
    ];
}
