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
    /// A malformed field in a workout export row.
    #[error("row {row}: invalid {field}: {message}")]
    Parse {
        row: usize,
        field: &'static str,
        message: String,
    },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    /// Upload of one activity failed; the remaining uploads were skipped.
    #[error("{source} activity: {name} and date {start_date_local} ({uploaded} uploaded before failure)")]
    Upload {
        name: String,
        start_date_local: String,
        uploaded: usize,
        #[source]
        source: Box<AppError>,
    },

    /// Missing, expired or un-refreshable OAuth token. Requires a new
    /// browser authorization.
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Reconciliation cancelled after {uploaded} uploads")]
    Cancelled { uploaded: usize },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Strava rejected the access token.
    pub const STRAVA_TOKEN_ERROR: &'static str = "Strava rejected the access token";

    /// Create a parse error for the given 1-based row.
    pub fn parse(row: usize, field: &'static str, message: impl Into<String>) -> Self {
        AppError::Parse {
            row,
            field,
            message: message.into(),
        }
    }

    /// Whether the caller must restart the browser authorization flow.
    pub fn requires_reauthorization(&self) -> bool {
        match self {
            AppError::Credential(_) => true,
            AppError::Upload { source, .. } => source.requires_reauthorization(),
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
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Parse { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "parse_error",
                Some(self.to_string()),
            ),
            AppError::StravaApi(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone()))
            }
            AppError::Upload { .. } => {
                (StatusCode::BAD_GATEWAY, "upload_error", Some(self.to_string()))
            }
            AppError::Credential(msg) => {
                (StatusCode::UNAUTHORIZED, "credential_error", Some(msg.clone()))
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Token storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Cancelled { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "cancelled",
                Some(self.to_string()),
            ),
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
