//! API error handling
//!
//! Maps the domain taxonomy onto HTTP: validation and missing-rate problems
//! are 400s, missing entities 404s, optimistic-concurrency losses and
//! billing locks 409s, and already-compensated write failures 500s. Every
//! body carries a machine-readable `error` code plus a human message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_invoicing::InvoicingError;
use infra_db::DatabaseError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing exchange rate: {0}")]
    MissingExchangeRate(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Record locked: {0}")]
    Locked(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
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
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::MissingExchangeRate(msg) => {
                (StatusCode::BAD_REQUEST, "missing_exchange_rate", msg.clone())
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Locked(msg) => (StatusCode::CONFLICT, "record_locked", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone()),
            ApiError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<InvoicingError> for ApiError {
    fn from(err: InvoicingError) -> Self {
        match err {
            InvoicingError::Validation(msg) => ApiError::Validation(msg),
            InvoicingError::NotFound(msg) => ApiError::NotFound(msg),
            InvoicingError::Conflict(msg) => ApiError::Conflict(msg),
            InvoicingError::Locked { .. } => ApiError::Locked(err.to_string()),
            InvoicingError::MissingExchangeRate { .. } => {
                ApiError::MissingExchangeRate(err.to_string())
            }
            InvoicingError::Write(msg) => ApiError::Internal(msg),
            InvoicingError::Money(e) => ApiError::Validation(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            e if e.is_not_found() => ApiError::NotFound(e.to_string()),
            e if e.is_duplicate() => ApiError::Conflict(e.to_string()),
            e => ApiError::Database(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
