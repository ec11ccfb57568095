//! Request authentication.
//!
//! # Purpose
//! Turns the `Authorization` header into an [`Actor`], and hosts the login
//! endpoints and password hashing.
//!
//! # Key invariants
//! - No header means an anonymous actor; a header that is present but not a
//!   valid bearer token is always 401, even on open endpoints.
//! - The role comes from the stored account, not the token, so role changes
//!   and deletions take effect before the token expires.
pub mod login;
pub mod password;

use crate::api::error::{ApiError, api_unauthorized};
use crate::app::AppState;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use housing_authz::Actor;

/// The authenticated (or anonymous) caller of a request.
pub struct CurrentActor(pub Actor);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_actor(state, &parts.headers).await.map(CurrentActor)
    }
}

pub(crate) async fn resolve_actor(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Actor, ApiError> {
    if !headers.contains_key(AUTHORIZATION) {
        return Ok(Actor::Anonymous);
    }
    let bearer = extract_bearer(headers)
        .ok_or_else(|| api_unauthorized("malformed authorization header"))?;
    let claims = state.verifier.verify(bearer).map_err(|err| {
        tracing::debug!(error = %err, "bearer token rejected");
        api_unauthorized("invalid token")
    })?;
    let claimed = claims.actor().map_err(|_| api_unauthorized("invalid token"))?;
    let user = state.service.current_user(&claimed).await?;
    Ok(Actor::user(user.id, Some(user.role)))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix("Bearer ")
}
