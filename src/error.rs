// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type shared by the sync pipeline and the consent routes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The upstream refused the call for lack of granted scopes, or the
    /// refresh token was revoked. Requires a human to re-authenticate.
    #[error("Insufficient permission: {0}")]
    PermissionDenied(String),

    #[error("Classroom API error: {0}")]
    Upstream(String),

    #[error("OAuth error: {0}")]
    Auth(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Checkpoint store error: {0}")]
    Store(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message Google puts in `errors[0].message` when a scope is missing.
    pub const INSUFFICIENT_PERMISSION: &'static str = "Insufficient Permission";

    /// OAuth error code returned when a refresh token has been revoked.
    pub const INVALID_GRANT: &'static str = "invalid_grant";

    /// Whether this error must stop the process until someone re-authenticates.
    pub fn is_permission_error(&self) -> bool {
        match self {
            AppError::PermissionDenied(_) => true,
            AppError::Auth(msg) => msg.contains(Self::INVALID_GRANT),
            _ => false,
        }
    }
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
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::PermissionDenied(msg) => {
                (StatusCode::FORBIDDEN, "permission_denied", Some(msg.clone()))
            }
            AppError::Auth(msg) | AppError::Upstream(msg) => {
                (StatusCode::BAD_GATEWAY, "upstream_error", Some(msg.clone()))
            }
            AppError::Delivery(msg) | AppError::Store(msg) => {
                tracing::error!(error = %msg, "Internal failure while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
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

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, AppError>;
