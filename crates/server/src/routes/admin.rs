//! Operator account management. Every route here requires the admin token.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use database::{validation, DatabaseError, Role, UserProfile};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{metrics, ApiResponse};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Admin routes, to be nested under `/api/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/create-user", post(create_user))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/resend-verification", post(resend_verification))
        .route("/users/:id/role", put(update_role))
        .route("/metrics", get(metrics::metrics))
        .route("/test-config", post(test_config))
        .route("/send-test-email", post(send_test_email))
}

/// A user as shown in the admin panel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// Always true; there is no verification flow.
    pub email_verified: bool,
    pub department: Option<String>,
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Last profile change.
    pub last_login: DateTime<Utc>,
}

impl From<UserProfile> for UserSummary {
    fn from(user: UserProfile) -> Self {
        Self {
            display_name: user.display_name(),
            id: user.id,
            email: user.email,
            role: user.role,
            email_verified: true,
            department: user.department,
            contact_number: user.phone,
            created_at: user.audit.created_at,
            last_login: user.audit.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub success: bool,
    pub user: UserSummary,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub contact_number: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn parse_role(role: Option<&str>) -> Result<Role> {
    role.and_then(Role::parse)
        .ok_or_else(|| ApiError::BadRequest("Invalid role. Must be admin or user".to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn duplicate_email() -> ApiError {
    ApiError::BadRequest("User with this email already exists".to_string())
}

/// Split a display name into first name and the rest.
fn split_display_name(display_name: &str) -> (String, String) {
    let mut words = display_name.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let last = words.collect::<Vec<_>>().join(" ");
    (first, last)
}

async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>> {
    let users = state.db.list_all::<UserProfile>().await?;
    tracing::debug!(count = users.len(), "Listing users");

    Ok(Json(UsersResponse {
        success: true,
        users: users.into_iter().map(UserSummary::from).collect(),
    }))
}

async fn create_user(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserCreatedResponse>)> {
    let request = json_body(body)?;

    let (Some(email), Some(display_name), Some(role)) = (
        non_blank(request.email),
        non_blank(request.display_name),
        non_blank(request.role),
    ) else {
        return Err(ApiError::BadRequest(
            "Email, display name, and role are required".to_string(),
        ));
    };
    let role = parse_role(Some(&role))?;

    let existing = state.db.list_all::<UserProfile>().await?;
    if existing
        .iter()
        .any(|user| user.email.eq_ignore_ascii_case(&email))
    {
        return Err(duplicate_email());
    }

    let (first_name, last_name) = split_display_name(&display_name);
    let fields = json!({
        "email": email,
        "firstName": first_name,
        "lastName": last_name,
        "phone": non_blank(request.contact_number),
        "department": non_blank(request.department),
        "role": role,
    });
    let serde_json::Value::Object(fields) = fields else {
        return Err(ApiError::BadRequest("Invalid user payload".to_string()));
    };

    // A concurrent request can still win between the check and the insert.
    let user = match state.db.create::<UserProfile>(fields).await {
        Ok(user) => user,
        Err(DatabaseError::AlreadyExists { .. }) => return Err(duplicate_email()),
        Err(err) => return Err(err.into()),
    };
    tracing::info!(id = %user.id, role = role.as_str(), "User created");

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            success: true,
            user: user.into(),
            message: "User created successfully.".to_string(),
        }),
    ))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let user = state
        .db
        .get::<UserProfile>(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    if user
        .email
        .eq_ignore_ascii_case(&state.config.system_admin_email)
    {
        tracing::warn!(id = %id, "Refused to delete system administrator");
        return Err(ApiError::Forbidden(
            "Cannot delete system administrator".to_string(),
        ));
    }

    if !state.db.delete::<UserProfile>(&id).await? {
        return Err(ApiError::not_found("User"));
    }

    tracing::info!(id = %id, "User deleted");
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

async fn resend_verification(Path(id): Path<String>) -> Json<ApiResponse<()>> {
    tracing::debug!(id = %id, "Verification resend requested");
    Json(ApiResponse::message(
        "Email verification not required in this version",
    ))
}

async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let request = json_body(body)?;
    let role = parse_role(request.role.as_deref())?;

    let patch = match json!({ "role": role }) {
        serde_json::Value::Object(patch) => patch,
        _ => return Err(ApiError::BadRequest("Invalid role payload".to_string())),
    };

    state
        .db
        .update::<UserProfile>(&id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(id = %id, role = role.as_str(), "User role updated");
    Ok(Json(ApiResponse::data(
        json!({ "message": "User role updated successfully" }),
    )))
}

#[derive(Debug, Default, Deserialize)]
pub struct TestEmailRequest {
    pub email: Option<String>,
}

/// Acknowledge a test email. Nothing is sent; there is no mail transport.
async fn send_test_email(
    State(state): State<AppState>,
    body: std::result::Result<Json<TestEmailRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>> {
    let request = json_body(body)?;
    let Some(email) = non_blank(request.email) else {
        return Err(ApiError::BadRequest("Email address is required".to_string()));
    };
    validation::validate_email(&email).map_err(DatabaseError::from)?;

    tracing::info!(
        to = %email,
        smtp_configured = state.config.smtp_configured,
        "Test email simulated"
    );
    Ok(Json(ApiResponse::message(format!(
        "Test email simulated for {} (email delivery is disabled)",
        email
    ))))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub configured: bool,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_in_memory_fallback: Option<bool>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigStatus {
    pub database: ServiceStatus,
    pub smtp: ServiceStatus,
    pub deployment: ServiceStatus,
}

#[derive(Debug, Serialize)]
pub struct ConfigTestResponse {
    pub success: bool,
    pub status: ConfigStatus,
}

async fn test_config(State(state): State<AppState>) -> Json<ConfigTestResponse> {
    let connected = state.db.check_connection().await;
    let fallback = state.db.is_using_in_memory_fallback();

    let database = ServiceStatus {
        configured: true,
        connected,
        using_in_memory_fallback: Some(fallback),
        message: if connected {
            "SQLite database reachable".to_string()
        } else {
            "Database unreachable, serving from in-memory store until restart".to_string()
        },
    };

    let smtp = if state.config.smtp_configured {
        ServiceStatus {
            configured: true,
            connected: false,
            using_in_memory_fallback: None,
            message: "SMTP credentials present; email delivery is disabled".to_string(),
        }
    } else {
        ServiceStatus {
            configured: false,
            connected: false,
            using_in_memory_fallback: None,
            message: "EMAIL_USER and EMAIL_PASS environment variables not set".to_string(),
        }
    };

    let deployment = ServiceStatus {
        configured: true,
        connected: true,
        using_in_memory_fallback: None,
        message: format!("Listening on {}", state.config.addr),
    };

    Json(ConfigTestResponse {
        success: true,
        status: ConfigStatus {
            database,
            smtp,
            deployment,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::router;
    use crate::routes::test_support::*;
    use axum::http::Method;

    #[test]
    fn test_split_display_name() {
        assert_eq!(
            split_display_name("Ada  King Lovelace"),
            ("Ada".to_string(), "King Lovelace".to_string())
        );
        assert_eq!(split_display_name("Prince"), ("Prince".to_string(), String::new()));
    }

    #[tokio::test]
    async fn test_create_list_and_delete_user() {
        let app = router(relational_state().await);

        let (status, body) = admin(
            &app,
            Method::POST,
            "/api/admin/create-user",
            Some(json!({
                "email": "ada@yitro.com",
                "displayName": "Ada Lovelace",
                "role": "admin",
                "contactNumber": "+1-555-0199",
                "department": "Engineering"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["displayName"], "Ada Lovelace");
        assert_eq!(body["user"]["role"], "admin");
        assert_eq!(body["user"]["contactNumber"], "+1-555-0199");
        let id = body["user"]["id"].as_str().unwrap().to_string();

        let (status, body) = admin(&app, Method::GET, "/api/admin/users", None).await;
        assert_eq!(status, StatusCode::OK);
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["email"], "ada@yitro.com");
        assert_eq!(users[0]["emailVerified"], true);
        assert_eq!(users[0]["department"], "Engineering");

        let (status, body) = admin(
            &app,
            Method::POST,
            "/api/admin/create-user",
            Some(json!({ "email": "ADA@yitro.com", "displayName": "Ada", "role": "user" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User with this email already exists");

        let (status, _) = admin(&app, Method::DELETE, &format!("/api/admin/users/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            admin(&app, Method::DELETE, &format!("/api/admin/users/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_create_user_rejects_incomplete_requests() {
        let app = router(relational_state().await);

        let (status, body) = admin(
            &app,
            Method::POST,
            "/api/admin/create-user",
            Some(json!({ "email": "x@yitro.com", "displayName": "X" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email, display name, and role are required");

        let (status, body) = admin(
            &app,
            Method::POST,
            "/api/admin/create-user",
            Some(json!({ "email": "x@yitro.com", "displayName": "X", "role": "owner" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid role. Must be admin or user");

        let (status, _) = admin(
            &app,
            Method::POST,
            "/api/admin/create-user",
            Some(json!({ "email": "not-an-email", "displayName": "X", "role": "user" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_system_admin_cannot_be_deleted() {
        let app = router(unreachable_state());

        let (status, body) = admin(&app, Method::DELETE, "/api/admin/users/usr1", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Cannot delete system administrator");

        let (status, _) = admin(&app, Method::DELETE, "/api/admin/users/usr2", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = admin(&app, Method::GET, "/api/admin/users", None).await;
        assert_eq!(body["users"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_role() {
        let app = router(unreachable_state());

        let (status, body) = admin(
            &app,
            Method::PUT,
            "/api/admin/users/usr2/role",
            Some(json!({ "role": "admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "User role updated successfully");

        let (_, body) = admin(&app, Method::GET, "/api/admin/users", None).await;
        let users = body["users"].as_array().unwrap();
        assert!(users.iter().all(|user| user["role"] == "admin"));

        let (status, _) = admin(
            &app,
            Method::PUT,
            "/api/admin/users/usr2/role",
            Some(json!({ "role": "superuser" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = admin(
            &app,
            Method::PUT,
            "/api/admin/users/missing/role",
            Some(json!({ "role": "user" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_create_user_in_memory_mode() {
        let app = router(unreachable_state());

        let requests: Vec<_> = (0..6)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    admin(
                        &app,
                        Method::POST,
                        "/api/admin/create-user",
                        Some(json!({
                            "email": "twin@yitro.com",
                            "displayName": format!("Twin {}", i),
                            "role": "user"
                        })),
                    )
                    .await
                })
            })
            .collect();

        let mut created = 0;
        for request in requests {
            let (status, body) = request.await.unwrap();
            if status == StatusCode::CREATED {
                created += 1;
            } else {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body["error"], "User with this email already exists");
            }
        }
        assert_eq!(created, 1);

        let (_, body) = admin(&app, Method::GET, "/api/admin/users", None).await;
        let twins = body["users"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|user| user["email"] == "twin@yitro.com")
            .count();
        assert_eq!(twins, 1);
    }

    #[tokio::test]
    async fn test_send_test_email_is_acknowledged() {
        let app = router(relational_state().await);

        let (status, body) = admin(
            &app,
            Method::POST,
            "/api/admin/send-test-email",
            Some(json!({ "email": "ops@yitro.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("ops@yitro.com"));

        for payload in [json!({}), json!({ "email": "  " })] {
            let (status, body) = admin(
                &app,
                Method::POST,
                "/api/admin/send-test-email",
                Some(payload),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Email address is required");
        }

        let (status, _) = admin(
            &app,
            Method::POST,
            "/api/admin/send-test-email",
            Some(json!({ "email": "nobody" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/admin/send-test-email",
            Some(json!({ "email": "ops@yitro.com" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_resend_verification_and_config_probe() {
        let app = router(relational_state().await);

        let (status, body) = admin(
            &app,
            Method::POST,
            "/api/admin/users/usr1/resend-verification",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = admin(&app, Method::POST, "/api/admin/test-config", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["database"]["connected"], true);
        assert_eq!(body["status"]["database"]["usingInMemoryFallback"], false);
        assert_eq!(body["status"]["smtp"]["configured"], false);

        let app = router(unreachable_state());
        let (_, body) = admin(&app, Method::POST, "/api/admin/test-config", None).await;
        assert_eq!(body["status"]["database"]["connected"], false);
        assert_eq!(body["status"]["database"]["usingInMemoryFallback"], true);
    }
}
