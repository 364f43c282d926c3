//! CRUD endpoints shared by every CRM record kind.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use database::{Entity, Fields, ListQuery};

use super::ApiResponse;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Routes for one kind, to be nested under `/api/<kind>`.
pub fn routes<E: Entity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<E>).post(create::<E>))
        .route("/:id", get(show::<E>).put(update::<E>).delete(destroy::<E>))
}

fn json_body(body: std::result::Result<Json<Fields>, JsonRejection>) -> Result<Fields> {
    body.map(|Json(fields)| fields)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn list<E: Entity>(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<E>>>> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let page = state.db.list::<E>(&query).await?;

    Ok(Json(ApiResponse {
        pagination: Some(page.pagination),
        ..ApiResponse::data(page.data)
    }))
}

async fn show<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<E>>> {
    let record = state
        .db
        .get::<E>(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(E::DESCRIPTOR.name))?;

    Ok(Json(ApiResponse::data(record)))
}

async fn create<E: Entity>(
    State(state): State<AppState>,
    body: std::result::Result<Json<Fields>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<E>>)> {
    let fields = json_body(body)?;
    let record = state.db.create::<E>(fields).await?;
    tracing::info!(entity = E::DESCRIPTOR.name, id = record.id(), "Record created");

    let message = format!("{} created successfully", E::DESCRIPTOR.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(record).with_message(message)),
    ))
}

async fn update<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<Fields>, JsonRejection>,
) -> Result<Json<ApiResponse<E>>> {
    let patch = json_body(body)?;
    let record = state
        .db
        .update::<E>(&id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found(E::DESCRIPTOR.name))?;

    let message = format!("{} updated successfully", E::DESCRIPTOR.name);
    Ok(Json(ApiResponse::data(record).with_message(message)))
}

async fn destroy<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.db.delete::<E>(&id).await? {
        return Err(ApiError::not_found(E::DESCRIPTOR.name));
    }

    tracing::info!(entity = E::DESCRIPTOR.name, id = %id, "Record deleted");
    Ok(Json(ApiResponse::message(format!(
        "{} deleted successfully",
        E::DESCRIPTOR.name
    ))))
}
