//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Engine errors keep their identifier as the response `code`; the HTTP
//! status is derived from the error's kind. Storage failures are logged and
//! answered with a generic 500 body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use raffle_engine::{ErrorKind, RaffleError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "RaffleNotFound", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// An engine operation failed.
    #[error(transparent)]
    Raffle(#[from] RaffleError),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Raffle(err) => {
                let status = match err.kind() {
                    ErrorKind::NotFound { .. } => StatusCode::NOT_FOUND,
                    ErrorKind::InvalidState { .. }
                    | ErrorKind::Duplicate { .. }
                    | ErrorKind::ConcurrencyConflict => StatusCode::CONFLICT,
                    ErrorKind::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose storage error messages to clients.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}
