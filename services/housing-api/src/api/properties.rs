//! Property API handlers.
//!
//! # Purpose
//! Listing and detail are open to any authenticated caller; writes are
//! limited to landlords and administrators. The landlord is always the caller.
use crate::api::error::ApiError;
use crate::api::types::PropertyListResponse;
use crate::api::{RecordPath, write_body};
use crate::app::AppState;
use crate::auth::CurrentActor;
use crate::model::{Property, PropertyPatch, PropertyWrite};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use housing_authz::{Action, EntityKind};

const ENTITY: EntityKind = EntityKind::Property;

#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "properties",
    responses(
        (status = 200, description = "List properties", body = PropertyListResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_properties(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<PropertyListResponse>, ApiError> {
    let items = state.service.list_properties(&actor).await?;
    Ok(Json(PropertyListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "properties",
    request_body = PropertyWrite,
    responses(
        (status = 201, description = "Property created", body = Property),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_property(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<PropertyWrite>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Create, payload)?;
    let created = state.service.create_property(&actor, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "properties",
    params(("id" = i64, Path, description = "Property id")),
    responses(
        (status = 200, description = "Property detail", body = Property),
        (status = 404, description = "Property not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_property(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<Json<Property>, ApiError> {
    Ok(Json(state.service.get_property(&actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "properties",
    params(("id" = i64, Path, description = "Property id")),
    request_body = PropertyWrite,
    responses(
        (status = 200, description = "Property replaced", body = Property),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Property not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn replace_property(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<PropertyWrite>, JsonRejection>,
) -> Result<Json<Property>, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    let updated = state
        .service
        .update_property(&actor, id, PropertyPatch::from(body))
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/properties/{id}",
    tag = "properties",
    params(("id" = i64, Path, description = "Property id")),
    request_body = PropertyPatch,
    responses(
        (status = 200, description = "Property updated", body = Property),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Property not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn patch_property(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<PropertyPatch>, JsonRejection>,
) -> Result<Json<Property>, ApiError> {
    let patch = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    Ok(Json(state.service.update_property(&actor, id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    tag = "properties",
    params(("id" = i64, Path, description = "Property id")),
    responses(
        (status = 204, description = "Property deleted"),
        (status = 404, description = "Property not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_property(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<StatusCode, ApiError> {
    state.service.delete_property(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
