//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every endpoint returns the
//! same error shape, and maps service failures onto status codes.
//!
//! # Key invariants and assumptions
//! - Error responses always carry a stable `code` and a readable `message`.
//! - NotFound is used both for missing ids and for records outside the
//!   caller's scope; the two are indistinguishable on the wire.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
use crate::api::types::ErrorResponse;
use crate::service::ServiceError;
use crate::store::StoreError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Structured API error returned by handlers.
///
/// # Invariants
/// - `status` must match the semantics of `body.code`.
///
/// # Example
/// ```rust
/// use axum::http::StatusCode;
/// use housing_api::api::error::ApiError;
/// use housing_api::api::types::ErrorResponse;
///
/// let err = ApiError {
///     status: StatusCode::NOT_FOUND,
///     body: ErrorResponse {
///         code: "not_found".to_string(),
///         message: "property not found".to_string(),
///         request_id: None,
///     },
/// };
/// assert_eq!(err.status, StatusCode::NOT_FOUND);
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized => api_unauthorized("authentication required"),
            ServiceError::Forbidden => api_forbidden("permission denied"),
            ServiceError::NotFound(what) => api_not_found(&format!("{what} not found")),
            ServiceError::Validation(message) => api_validation_error(&message),
            ServiceError::Store(err) => api_internal("storage failure", &err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        api_validation_error(&rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        // Ids are numeric; anything else cannot name a record.
        api_not_found("record not found")
    }
}

fn error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 404 Not Found error.
pub fn api_not_found(message: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 500 Internal Server Error from a store error.
///
/// # What it does
/// Logs the store error and returns a generic internal error response.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "housing storage error");
    error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 500 Internal Server Error without a store error.
pub fn api_internal_message(message: &str) -> ApiError {
    error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 401 Unauthorized error.
pub fn api_unauthorized(message: &str) -> ApiError {
    error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Build a 403 Forbidden error.
pub fn api_forbidden(message: &str) -> ApiError {
    error(StatusCode::FORBIDDEN, "forbidden", message)
}

/// Build a 400 Bad Request validation error.
///
/// Used for field validation failures, malformed JSON, and unknown choice
/// values alike.
pub fn api_validation_error(message: &str) -> ApiError {
    error(StatusCode::BAD_REQUEST, "validation_error", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_helpers_build_expected_codes() {
        let not_found = api_not_found("missing");
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.body.code, "not_found");

        let internal = api_internal_message("oops");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.body.code, "internal");

        let unauthorized = api_unauthorized("nope");
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unauthorized.body.code, "unauthorized");

        let forbidden = api_forbidden("nope");
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
        assert_eq!(forbidden.body.code, "forbidden");

        let validation = api_validation_error("bad");
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.body.code, "validation_error");
    }

    #[test]
    fn api_internal_logs_and_wraps_store_error() {
        let err = StoreError::Unexpected(anyhow::anyhow!("boom"));
        let api = api_internal("storage failed", &err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body.code, "internal");
        assert_eq!(api.body.message, "storage failed");
    }

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden, StatusCode::FORBIDDEN),
            (ServiceError::NotFound("property".into()), StatusCode::NOT_FOUND),
            (
                ServiceError::Validation("city: may not be blank".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Store(StoreError::Unexpected(anyhow::anyhow!("db down"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn internal_errors_hide_store_details() {
        let api = ApiError::from(ServiceError::Store(StoreError::Unexpected(anyhow::anyhow!(
            "password authentication failed for user housing"
        ))));
        assert_eq!(api.body.message, "storage failure");
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let api = ApiError::from(ServiceError::NotFound("rental agreement".into()));
        assert_eq!(api.body.message, "rental agreement not found");
    }
}
