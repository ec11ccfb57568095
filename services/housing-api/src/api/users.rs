//! User account API handlers.
//!
//! # Purpose
//! Registration is open to anonymous callers. Every other verb is reserved
//! for administrators.
//!
//! # Security considerations
//! - Passwords are write-only and never echoed back.
use crate::api::error::ApiError;
use crate::api::types::UserListResponse;
use crate::api::{RecordPath, write_body};
use crate::app::AppState;
use crate::auth::CurrentActor;
use crate::model::{User, UserPatch, UserWrite};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use housing_authz::{Action, EntityKind};

const ENTITY: EntityKind = EntityKind::User;

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "List all accounts", body = UserListResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<UserListResponse>, ApiError> {
    let items = state.service.list_users(&actor).await?;
    Ok(Json(UserListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = UserWrite,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<UserWrite>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Create, payload)?;
    let created = state.service.create_user(&actor, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User detail", body = User),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.service.get_user(&actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserWrite,
    responses(
        (status = 200, description = "User replaced", body = User),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn replace_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<UserWrite>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    let updated = state
        .service
        .update_user(&actor, id, UserPatch::from(body))
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn patch_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let patch = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    Ok(Json(state.service.update_user(&actor, id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<StatusCode, ApiError> {
    state.service.delete_user(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
