//! Forum post API handlers.
//!
//! # Purpose
//! Every read returns posts as threads with their replies nested newest first.
//! Create and update also answer with the thread so clients can re-render it.
use crate::api::error::ApiError;
use crate::api::types::ForumThreadListResponse;
use crate::api::{RecordPath, write_body};
use crate::app::AppState;
use crate::auth::CurrentActor;
use crate::model::{ForumPostPatch, ForumPostWrite, ForumThread};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use housing_authz::{Action, EntityKind};

const ENTITY: EntityKind = EntityKind::ForumPost;

#[utoipa::path(
    get,
    path = "/api/forum-posts",
    tag = "forum-posts",
    responses(
        (status = 200, description = "List every post with its nested replies", body = ForumThreadListResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_forum_posts(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ForumThreadListResponse>, ApiError> {
    let items = state.service.list_forum_posts(&actor).await?;
    Ok(Json(ForumThreadListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/forum-posts",
    tag = "forum-posts",
    request_body = ForumPostWrite,
    responses(
        (status = 201, description = "Forum post created", body = ForumThread),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_forum_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<ForumPostWrite>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Create, payload)?;
    let created = state.service.create_forum_post(&actor, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/forum-posts/{id}",
    tag = "forum-posts",
    params(("id" = i64, Path, description = "Forum post id")),
    responses(
        (status = 200, description = "Forum post detail", body = ForumThread),
        (status = 404, description = "Forum post not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_forum_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<Json<ForumThread>, ApiError> {
    Ok(Json(state.service.get_forum_post(&actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/forum-posts/{id}",
    tag = "forum-posts",
    params(("id" = i64, Path, description = "Forum post id")),
    request_body = ForumPostWrite,
    responses(
        (status = 200, description = "Forum post replaced", body = ForumThread),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Forum post not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn replace_forum_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<ForumPostWrite>, JsonRejection>,
) -> Result<Json<ForumThread>, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    let updated = state
        .service
        .update_forum_post(&actor, id, ForumPostPatch::from(body))
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/forum-posts/{id}",
    tag = "forum-posts",
    params(("id" = i64, Path, description = "Forum post id")),
    request_body = ForumPostPatch,
    responses(
        (status = 200, description = "Forum post updated", body = ForumThread),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Forum post not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn patch_forum_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<ForumPostPatch>, JsonRejection>,
) -> Result<Json<ForumThread>, ApiError> {
    let patch = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    Ok(Json(state.service.update_forum_post(&actor, id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/forum-posts/{id}",
    tag = "forum-posts",
    params(("id" = i64, Path, description = "Forum post id")),
    responses(
        (status = 204, description = "Forum post deleted"),
        (status = 404, description = "Forum post not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_forum_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<StatusCode, ApiError> {
    state.service.delete_forum_post(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
