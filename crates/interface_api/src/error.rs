//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_billing::{BillingError, ErrorKind};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream transfer failed: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    Internal(String),
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
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "transfer_failed", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Unauthorized => ApiError::Forbidden(message),
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::MeterInactive | ErrorKind::BillAlreadyPaid => ApiError::Conflict(message),
            ErrorKind::InsufficientPayment | ErrorKind::InvalidInput => ApiError::Validation(message),
            ErrorKind::TransferFailed => ApiError::BadGateway(message),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("ledger task failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{BillId, Currency, MeterId, Money, PartyId};

    fn status_of(err: BillingError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_billing_errors_map_to_status_codes() {
        let meter = MeterId::first();
        let eth = |minor| Money::from_minor(minor, Currency::ETH);

        assert_eq!(
            status_of(BillingError::Unauthorized { caller: PartyId::new() }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(BillingError::MeterNotFound(meter)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(BillingError::BillNotFound { meter_id: meter, index: 4 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(BillingError::MeterInactive(meter)), StatusCode::CONFLICT);
        assert_eq!(
            status_of(BillingError::BillAlreadyPaid(BillId::first())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(BillingError::InsufficientPayment {
                required: eth(2),
                tendered: eth(1)
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(BillingError::invalid_input("blank")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(BillingError::TransferFailed("offline".into())),
            StatusCode::BAD_GATEWAY
        );
    }
}
