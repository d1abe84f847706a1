//! Response types for the Payslip Calculation Engine API.
//!
//! This module defines the error response structures and the mapping from
//! [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                ApiError::with_details(
                    "NOT_FOUND",
                    message,
                    format!("No {} exists with id {}", entity, id),
                ),
            ),
            EngineError::InvalidPeriod { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_PERIOD",
                    message,
                    "The period must contain at least one weekday",
                ),
            ),
            EngineError::InvalidInput { .. } => {
                (StatusCode::BAD_REQUEST, ApiError::validation_error(message))
            }
            EngineError::DuplicatePayslip { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("DUPLICATE_PAYSLIP", message),
            ),
            EngineError::AggregationFailure { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("AGGREGATION_FAILURE", message),
            ),
            EngineError::LedgerImbalance { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("LEDGER_IMBALANCE", message),
            ),
            EngineError::Persistence { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("PERSISTENCE_ERROR", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
