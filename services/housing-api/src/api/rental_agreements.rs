//! Rental agreement API handlers.
//!
//! # Purpose
//! Every verb is scoped: landlords reach agreements on their own properties,
//! tenants reach their own agreements, administrators reach all of them.
//! Anything outside that scope answers 404.
use crate::api::error::ApiError;
use crate::api::types::RentalAgreementListResponse;
use crate::api::{RecordPath, write_body};
use crate::app::AppState;
use crate::auth::CurrentActor;
use crate::model::{RentalAgreement, RentalAgreementPatch, RentalAgreementWrite};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use housing_authz::{Action, EntityKind};

const ENTITY: EntityKind = EntityKind::RentalAgreement;

#[utoipa::path(
    get,
    path = "/api/rental-agreements",
    tag = "rental-agreements",
    responses(
        (status = 200, description = "List rental agreements visible to the caller", body = RentalAgreementListResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_rental_agreements(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<RentalAgreementListResponse>, ApiError> {
    let items = state.service.list_rental_agreements(&actor).await?;
    Ok(Json(RentalAgreementListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/rental-agreements",
    tag = "rental-agreements",
    request_body = RentalAgreementWrite,
    responses(
        (status = 201, description = "Rental agreement created", body = RentalAgreement),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_rental_agreement(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<RentalAgreementWrite>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Create, payload)?;
    let created = state.service.create_rental_agreement(&actor, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/rental-agreements/{id}",
    tag = "rental-agreements",
    params(("id" = i64, Path, description = "Rental agreement id")),
    responses(
        (status = 200, description = "Rental agreement detail", body = RentalAgreement),
        (status = 404, description = "Rental agreement not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_rental_agreement(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<Json<RentalAgreement>, ApiError> {
    Ok(Json(state.service.get_rental_agreement(&actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/rental-agreements/{id}",
    tag = "rental-agreements",
    params(("id" = i64, Path, description = "Rental agreement id")),
    request_body = RentalAgreementWrite,
    responses(
        (status = 200, description = "Rental agreement replaced", body = RentalAgreement),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Rental agreement not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn replace_rental_agreement(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<RentalAgreementWrite>, JsonRejection>,
) -> Result<Json<RentalAgreement>, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    let updated = state
        .service
        .update_rental_agreement(&actor, id, RentalAgreementPatch::from(body))
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/rental-agreements/{id}",
    tag = "rental-agreements",
    params(("id" = i64, Path, description = "Rental agreement id")),
    request_body = RentalAgreementPatch,
    responses(
        (status = 200, description = "Rental agreement updated", body = RentalAgreement),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Rental agreement not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn patch_rental_agreement(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<RentalAgreementPatch>, JsonRejection>,
) -> Result<Json<RentalAgreement>, ApiError> {
    let patch = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    Ok(Json(state.service.update_rental_agreement(&actor, id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/rental-agreements/{id}",
    tag = "rental-agreements",
    params(("id" = i64, Path, description = "Rental agreement id")),
    responses(
        (status = 204, description = "Rental agreement deleted"),
        (status = 404, description = "Rental agreement not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_rental_agreement(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<StatusCode, ApiError> {
    state.service.delete_rental_agreement(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
