//! Housing HTTP API module.
//!
//! # Purpose
//! Exposes one handler module per record collection plus shared helpers for
//! turning extractor rejections into API errors.
pub mod error;
pub mod forum_posts;
pub mod openapi;
pub mod properties;
pub mod rental_agreements;
pub mod resources;
pub mod support_tickets;
pub mod system;
pub mod types;
pub mod users;

use crate::api::error::ApiError;
use crate::app::AppState;
use crate::model::RecordId;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use housing_authz::{Action, Actor, EntityKind};

/// Record id taken from the `:id` path segment. A non-numeric id is reported
/// as NotFound.
pub(crate) struct RecordPath(pub RecordId);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RecordPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<RecordId>::from_request_parts(parts, state).await?;
        Ok(RecordPath(id))
    }
}

/// Unwraps a JSON body for a write.
///
/// A malformed body is only reported once the caller is allowed to perform
/// the action, so anonymous or forbidden callers learn nothing from it.
pub(crate) fn write_body<T>(
    state: &AppState,
    actor: &Actor,
    entity: EntityKind,
    action: Action,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            state.service.authorize(actor, entity, action)?;
            Err(rejection.into())
        }
    }
}
