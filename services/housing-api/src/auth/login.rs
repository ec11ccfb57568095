//! Login and current-user endpoints.
//!
//! # Purpose
//! Exchanges a username/password pair for a bearer token and lets a token
//! holder read back their own account.
use crate::api::error::{ApiError, api_internal_message, api_validation_error};
use crate::api::types::{LoginRequest, TokenResponse};
use crate::app::AppState;
use crate::auth::CurrentActor;
use crate::model::User;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

#[utoipa::path(
    post,
    path = "/api/auth/token",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Malformed request", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;
    if request.username.is_empty() || request.password.is_empty() {
        return Err(api_validation_error("username and password are required"));
    }

    let user = state
        .service
        .authenticate(&request.username, &request.password)
        .await?;

    let access_token = state.issuer.mint(user.id, user.role).map_err(|err| {
        tracing::error!(error = %err, "failed to mint access token");
        api_internal_message("failed to mint token")
    })?;
    tracing::info!(user_id = user.id, "access token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.issuer.ttl().as_secs(),
        user,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "The authenticated account", body = User),
        (status = 401, description = "Missing or invalid token", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.service.current_user(&actor).await?))
}
