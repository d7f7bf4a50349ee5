//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses carry a JSON body of the shape `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::couriers::CourierError;
use crate::db::RepositoryError;
use crate::payments::PaymentError;

/// Application-level error type for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Courier partner API operation failed.
    #[error("Courier error: {0}")]
    Courier(#[from] CourierError),

    /// Payment gateway operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current resource state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Courier(_) | Self::Payment(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Courier(err) => match err {
                CourierError::UnknownPartner(_) => StatusCode::NOT_FOUND,
                CourierError::NotServiceable | CourierError::InvalidAwb(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Payment(err) => match err {
                PaymentError::InvalidSignature => StatusCode::UNAUTHORIZED,
                PaymentError::Gateway { .. } | PaymentError::Http(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "Internal server error".to_string(),
            },
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Courier(err) => match err {
                CourierError::UnknownPartner(code) => format!("Unknown courier partner: {code}"),
                CourierError::NotServiceable => "Lane not serviceable".to_string(),
                CourierError::InvalidAwb(awb) => format!("Invalid AWB: {awb}"),
                _ => "Courier service error".to_string(),
            },
            Self::Payment(err) => match err {
                PaymentError::InvalidSignature => "Invalid payment signature".to_string(),
                _ => "Payment gateway error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");

        let err = AppError::BadRequest("invalid pincode".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid pincode");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "duplicate".to_string()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_courier_error_mapping() {
        assert_eq!(
            get_status(AppError::Courier(CourierError::UnknownPartner(
                "acme".to_string()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Courier(CourierError::Api {
                status: 500,
                message: "upstream".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_payment_signature_maps_to_unauthorized() {
        assert_eq!(
            get_status(AppError::Payment(PaymentError::InvalidSignature)),
            StatusCode::UNAUTHORIZED
        );
    }
}
