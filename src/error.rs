// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

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

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a validation failure on one field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error kind, as returned in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::InvalidToken => "invalid_token",
            AppError::Forbidden(_) => "forbidden",
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Upstream(_) => "upstream_error",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, field) = match &self {
            AppError::Unauthorized | AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, self.to_string(), None)
            }
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string(), None),
            AppError::Validation { field, message } => {
                (StatusCode::BAD_REQUEST, message.clone(), Some(field.clone()))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream service error");
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: self.kind(),
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}

/// `snake_case` struct field to its `camelCase` JSON name.
fn json_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<validator::ValidationErrors> for AppError {
    /// Report the first offending field (alphabetical, for stable output).
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        match fields.first() {
            Some((field, errs)) => {
                let field = json_field_name(field);
                let message = errs
                    .first()
                    .map(|e| match &e.message {
                        Some(msg) => msg.to_string(),
                        None if e.code == "required" => format!("{} is required", field),
                        None => format!("{} is invalid ({})", field, e.code),
                    })
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::validation(field, message)
            }
            None => AppError::validation("body", "Invalid request"),
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
