// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Access denied. Admin only.")]
    AdminOnly,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Verification code expired")]
    CodeExpired,

    #[error("Invalid verification code")]
    CodeMismatch,

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Email delivery error: {0}")]
    Email(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::AdminOnly => (
                StatusCode::FORBIDDEN,
                "admin_only",
                Some("Access denied. Admin only.".to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            // Expired and wrong codes are distinct conditions with distinct
            // messages; the client shows different guidance for each.
            AppError::CodeExpired => (
                StatusCode::BAD_REQUEST,
                "code_expired",
                Some("Code expired. Please request a new code.".to_string()),
            ),
            AppError::CodeMismatch => (
                StatusCode::BAD_REQUEST,
                "code_mismatch",
                Some("Invalid verification code. Please try again.".to_string()),
            ),
            AppError::Identity(msg) => {
                (StatusCode::BAD_GATEWAY, "identity_error", Some(msg.clone()))
            }
            AppError::Email(msg) => (StatusCode::BAD_GATEWAY, "email_error", Some(msg.clone())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
