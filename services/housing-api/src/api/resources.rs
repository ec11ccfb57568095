//! Educational resource API handlers.
use crate::api::error::ApiError;
use crate::api::types::ResourceListResponse;
use crate::api::{RecordPath, write_body};
use crate::app::AppState;
use crate::auth::CurrentActor;
use crate::model::{Resource, ResourcePatch, ResourceWrite};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use housing_authz::{Action, EntityKind};

const ENTITY: EntityKind = EntityKind::Resource;

#[utoipa::path(
    get,
    path = "/api/resources",
    tag = "resources",
    responses(
        (status = 200, description = "List resources", body = ResourceListResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_resources(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ResourceListResponse>, ApiError> {
    let items = state.service.list_resources(&actor).await?;
    Ok(Json(ResourceListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/resources",
    tag = "resources",
    request_body = ResourceWrite,
    responses(
        (status = 201, description = "Resource created", body = Resource),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_resource(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<ResourceWrite>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Create, payload)?;
    let created = state.service.create_resource(&actor, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/resources/{id}",
    tag = "resources",
    params(("id" = i64, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Resource detail", body = Resource),
        (status = 404, description = "Resource not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_resource(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<Json<Resource>, ApiError> {
    Ok(Json(state.service.get_resource(&actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/resources/{id}",
    tag = "resources",
    params(("id" = i64, Path, description = "Resource id")),
    request_body = ResourceWrite,
    responses(
        (status = 200, description = "Resource replaced", body = Resource),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Resource not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn replace_resource(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<ResourceWrite>, JsonRejection>,
) -> Result<Json<Resource>, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    let updated = state
        .service
        .update_resource(&actor, id, ResourcePatch::from(body))
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/resources/{id}",
    tag = "resources",
    params(("id" = i64, Path, description = "Resource id")),
    request_body = ResourcePatch,
    responses(
        (status = 200, description = "Resource updated", body = Resource),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Resource not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn patch_resource(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<ResourcePatch>, JsonRejection>,
) -> Result<Json<Resource>, ApiError> {
    let patch = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    Ok(Json(state.service.update_resource(&actor, id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/resources/{id}",
    tag = "resources",
    params(("id" = i64, Path, description = "Resource id")),
    responses(
        (status = 204, description = "Resource deleted"),
        (status = 404, description = "Resource not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_resource(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<StatusCode, ApiError> {
    state.service.delete_resource(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
