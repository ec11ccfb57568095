//! Support ticket API handlers.
//!
//! # Purpose
//! Tickets belong to the caller that opened them. Non-administrators only
//! ever see their own tickets.
use crate::api::error::ApiError;
use crate::api::types::SupportTicketListResponse;
use crate::api::{RecordPath, write_body};
use crate::app::AppState;
use crate::auth::CurrentActor;
use crate::model::{SupportTicket, SupportTicketPatch, SupportTicketWrite};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use housing_authz::{Action, EntityKind};

const ENTITY: EntityKind = EntityKind::SupportTicket;

#[utoipa::path(
    get,
    path = "/api/support-tickets",
    tag = "support-tickets",
    responses(
        (status = 200, description = "List support tickets visible to the caller", body = SupportTicketListResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_support_tickets(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<SupportTicketListResponse>, ApiError> {
    let items = state.service.list_support_tickets(&actor).await?;
    Ok(Json(SupportTicketListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/support-tickets",
    tag = "support-tickets",
    request_body = SupportTicketWrite,
    responses(
        (status = 201, description = "Support ticket created", body = SupportTicket),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission denied", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_support_ticket(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<SupportTicketWrite>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Create, payload)?;
    let created = state.service.create_support_ticket(&actor, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/support-tickets/{id}",
    tag = "support-tickets",
    params(("id" = i64, Path, description = "Support ticket id")),
    responses(
        (status = 200, description = "Support ticket detail", body = SupportTicket),
        (status = 404, description = "Support ticket not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_support_ticket(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<Json<SupportTicket>, ApiError> {
    Ok(Json(state.service.get_support_ticket(&actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/support-tickets/{id}",
    tag = "support-tickets",
    params(("id" = i64, Path, description = "Support ticket id")),
    request_body = SupportTicketWrite,
    responses(
        (status = 200, description = "Support ticket replaced", body = SupportTicket),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Support ticket not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn replace_support_ticket(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<SupportTicketWrite>, JsonRejection>,
) -> Result<Json<SupportTicket>, ApiError> {
    let body = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    let updated = state
        .service
        .update_support_ticket(&actor, id, SupportTicketPatch::from(body))
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/support-tickets/{id}",
    tag = "support-tickets",
    params(("id" = i64, Path, description = "Support ticket id")),
    request_body = SupportTicketPatch,
    responses(
        (status = 200, description = "Support ticket updated", body = SupportTicket),
        (status = 400, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Support ticket not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn patch_support_ticket(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
    payload: Result<Json<SupportTicketPatch>, JsonRejection>,
) -> Result<Json<SupportTicket>, ApiError> {
    let patch = write_body(&state, &actor, ENTITY, Action::Update, payload)?;
    Ok(Json(state.service.update_support_ticket(&actor, id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/support-tickets/{id}",
    tag = "support-tickets",
    params(("id" = i64, Path, description = "Support ticket id")),
    responses(
        (status = 204, description = "Support ticket deleted"),
        (status = 404, description = "Support ticket not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_support_ticket(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    RecordPath(id): RecordPath,
) -> Result<StatusCode, ApiError> {
    state.service.delete_support_ticket(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
