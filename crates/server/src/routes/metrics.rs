//! Company-wide metrics for the admin dashboard.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use database::normalize::to_token;
use database::{
    Account, ActiveDeal, ActivityLog, DatabaseHandler, Lead, ListQuery, UserProfile,
};
use serde::Serialize;

use super::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

/// Stage token of a closed-won deal.
const WON_STAGE: &str = "ORDER_WON";

const RECENT_ACTIVITY_COUNT: u32 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_users: u64,
    pub active_users: u64,
    pub total_accounts: u64,
    pub total_leads: u64,
    pub total_deals: u64,
    pub total_activities: u64,
    pub won_deals: u64,
    pub total_deal_value: f64,
    /// Won deals as a percentage of all deals, two decimals.
    pub conversion_rate: f64,
    pub recent_activities: Vec<RecentActivity>,
}

#[derive(Debug, Serialize)]
pub struct RecentActivity {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub date: DateTime<Utc>,
    pub summary: String,
    pub account: Option<String>,
    pub contact: Option<String>,
}

impl From<ActivityLog> for RecentActivity {
    fn from(activity: ActivityLog) -> Self {
        Self {
            activity_type: activity.activity_type,
            date: activity.date_time,
            summary: activity.summary,
            account: activity.associated_account,
            contact: activity.associated_contact,
        }
    }
}

/// Record counts per kind.
#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    users: u64,
    accounts: u64,
    leads: u64,
    deals: u64,
    activities: u64,
}

fn summarize(totals: Totals, deals: &[ActiveDeal], recent: Vec<ActivityLog>) -> Metrics {
    let won: Vec<&ActiveDeal> = deals
        .iter()
        .filter(|deal| deal.stage.as_deref().map(to_token).as_deref() == Some(WON_STAGE))
        .collect();

    let total_deal_value = won
        .iter()
        .map(|deal| deal.deal_value.as_deref().map_or(0.0, leading_number))
        .sum();

    let won_deals = won.len() as u64;
    let conversion_rate = if totals.deals > 0 {
        let rate = won_deals as f64 / totals.deals as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    } else {
        0.0
    };

    Metrics {
        total_users: totals.users,
        active_users: totals.users,
        total_accounts: totals.accounts,
        total_leads: totals.leads,
        total_deals: totals.deals,
        total_activities: totals.activities,
        won_deals,
        total_deal_value,
        conversion_rate,
        recent_activities: recent.into_iter().map(RecentActivity::from).collect(),
    }
}

/// Parse the longest numeric prefix of `value`; 0 if there is none.
///
/// "150000" and "150000 USD" both give 150000; "$150,000" gives 0.
fn leading_number(value: &str) -> f64 {
    let value = value.trim_start();
    let end = value
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    (1..=end)
        .rev()
        .find_map(|len| value[..len].parse::<f64>().ok())
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}

/// Gather metrics through the handler, in whichever storage mode it is in.
pub async fn collect(db: &DatabaseHandler) -> database::Result<Metrics> {
    let deals = db.list_all::<ActiveDeal>().await?;
    let recent = db
        .list::<ActivityLog>(&ListQuery::new(1, RECENT_ACTIVITY_COUNT))
        .await?
        .data;

    let totals = Totals {
        users: db.count::<UserProfile>().await?,
        accounts: db.count::<Account>().await?,
        leads: db.count::<Lead>().await?,
        deals: deals.len() as u64,
        activities: db.count::<ActivityLog>().await?,
    };

    Ok(summarize(totals, &deals, recent))
}

/// `GET /api/admin/metrics`
pub async fn metrics(State(state): State<AppState>) -> Result<Json<ApiResponse<Metrics>>> {
    let metrics = collect(&state.db).await?;
    Ok(Json(ApiResponse::data(metrics)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::router;
    use crate::routes::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn deal(stage: &str, value: &str) -> ActiveDeal {
        serde_json::from_value(json!({
            "id": "ignored",
            "dealName": "Deal",
            "stage": stage,
            "dealValue": value,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "createdBy": "system",
            "updatedBy": "system"
        }))
        .unwrap()
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("150000"), 150000.0);
        assert_eq!(leading_number(" 2500.50 USD"), 2500.5);
        assert_eq!(leading_number("$150,000"), 0.0);
        assert_eq!(leading_number(""), 0.0);
        assert_eq!(leading_number("1e3"), 1000.0);
        assert_eq!(leading_number("12-"), 12.0);
    }

    #[test]
    fn test_summarize_counts_won_deals_in_any_form() {
        let deals = vec![
            deal("ORDER WON", "100000"),
            deal("Order Won", "not a number"),
            deal("NEGOTIATING", "999999"),
        ];
        let totals = Totals {
            deals: 3,
            ..Totals::default()
        };

        let metrics = summarize(totals, &deals, Vec::new());

        assert_eq!(metrics.won_deals, 2);
        assert_eq!(metrics.total_deal_value, 100000.0);
        assert_eq!(metrics.conversion_rate, 66.67);
    }

    #[test]
    fn test_summarize_without_deals() {
        let metrics = summarize(Totals::default(), &[], Vec::new());
        assert_eq!(metrics.won_deals, 0);
        assert_eq!(metrics.conversion_rate, 0.0);
        assert_eq!(metrics.total_deal_value, 0.0);
    }

    #[tokio::test]
    async fn test_metrics_from_seed_data() {
        let app = router(unreachable_state());

        let (status, body) = admin(&app, Method::GET, "/api/admin/metrics", None).await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["totalUsers"], 2);
        assert_eq!(data["totalAccounts"], 2);
        assert_eq!(data["totalLeads"], 1);
        assert_eq!(data["totalDeals"], 2);
        assert_eq!(data["totalActivities"], 1);
        assert_eq!(data["wonDeals"], 0);
        assert_eq!(data["conversionRate"], json!(0.0));
        assert_eq!(data["recentActivities"][0]["type"], "Call");
        assert_eq!(data["recentActivities"][0]["account"], "acc1");
    }

    #[tokio::test]
    async fn test_metrics_from_relational_store() {
        let app = router(relational_state().await);
        for (stage, value) in [("Order Won", "150000"), ("Negotiating", "250000")] {
            send(
                &app,
                Method::POST,
                "/api/deals",
                Some(json!({ "dealName": "Deal", "stage": stage, "dealValue": value })),
                None,
            )
            .await;
        }

        let (status, body) = admin(&app, Method::GET, "/api/admin/metrics", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalDeals"], 2);
        assert_eq!(body["data"]["wonDeals"], 1);
        assert_eq!(body["data"]["totalDealValue"], json!(150000.0));
        assert_eq!(body["data"]["conversionRate"], json!(50.0));
        assert_eq!(body["data"]["recentActivities"], json!([]));
    }
}
