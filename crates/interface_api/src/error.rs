//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_admin::AdminError;
use domain_billing::BillingError;
use domain_tariff::TariffError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone()),
            ApiError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let details = match &self {
            ApiError::Validation(msg) if msg.contains("; ") => {
                Some(msg.split("; ").map(str::to_string).collect())
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{} {} not found", entity_type, id))
            }
            PortError::Validation { message, .. } => ApiError::Validation(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Connection { message, .. } => ApiError::Database(message),
            PortError::Transformation { message } | PortError::Internal { message, .. } => {
                ApiError::Internal(message)
            }
        }
    }
}

impl From<TariffError> for ApiError {
    fn from(err: TariffError) -> Self {
        match err {
            TariffError::RateNotFound(id) => ApiError::NotFound(format!("Rate entry {} not found", id)),
            TariffError::Validation(msg) => ApiError::Validation(msg),
            TariffError::Money(e) => ApiError::Validation(e.to_string()),
            TariffError::Temporal(e) => ApiError::Validation(e.to_string()),
            TariffError::Port(e) => e.into(),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::RecordNotFound(id) => {
                ApiError::NotFound(format!("Bill record {} not found", id))
            }
            BillingError::Validation(msg) | BillingError::Calculation(msg) => ApiError::Validation(msg),
            BillingError::Serialization(e) => ApiError::Internal(e.to_string()),
            BillingError::Tariff(e) => e.into(),
            BillingError::Port(e) => e.into(),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".to_string()),
            AdminError::AlreadyExists => {
                ApiError::Conflict("Username or email already exists".to_string())
            }
            AdminError::RegistrationClosed => {
                ApiError::Forbidden("Access denied. Admin privileges required.".to_string())
            }
            AdminError::NotFound(id) => ApiError::NotFound(format!("Admin {} not found", id)),
            AdminError::Validation(msg) => ApiError::Validation(msg),
            AdminError::PasswordHash(msg) => ApiError::Internal(msg),
            AdminError::Port(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_domain_not_found_maps_to_404() {
        let error: ApiError = TariffError::RateNotFound("RATE-1".into()).into();
        assert!(matches!(error, ApiError::NotFound(_)));

        let error: ApiError = BillingError::Tariff(TariffError::RateNotFound("RATE-1".into())).into();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn test_admin_errors() {
        assert!(matches!(ApiError::from(AdminError::InvalidCredentials), ApiError::Unauthorized(_)));
        assert!(matches!(ApiError::from(AdminError::AlreadyExists), ApiError::Conflict(_)));
        assert!(matches!(ApiError::from(AdminError::RegistrationClosed), ApiError::Forbidden(_)));
    }

    #[test]
    fn test_storage_failures_are_opaque_500s() {
        let error: ApiError = PortError::connection("pool closed").into();
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
