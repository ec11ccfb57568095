//! System/health API handlers.
//!
//! # Key invariants
//! - Health checks must be fast and side-effect free.
//! - The endpoint is open; it reveals the storage backend name and nothing
//!   about stored records.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::HealthStatus;
use crate::app::AppState;
use crate::service::ServiceError;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service health", body = HealthStatus),
        (status = 500, description = "Storage unavailable", body = crate::api::types::ErrorResponse)
    )
)]
/// Return service health.
///
/// # What it does
/// Probes the backing store and returns `ok` if healthy.
///
/// # Errors
/// - Returns 500 if the storage health check fails.
pub(crate) async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    match state.service.health_check().await {
        Ok(()) => Ok(Json(HealthStatus {
            status: "ok".to_string(),
            storage: state.service.backend_name().to_string(),
            durable: state.service.is_durable(),
        })),
        Err(ServiceError::Store(err)) => Err(api_internal("storage unavailable", &err)),
        Err(other) => Err(other.into()),
    }
}
