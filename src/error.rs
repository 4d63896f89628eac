//! Error types for the zone editor.
//!
//! Defines a unified error type that maps cleanly to HTTP responses.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::api::Reply;

/// Unified error type for zone editor operations.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("Access denied")]
    AccessDenied,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Malformed request body: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("Zone document at {path} is not valid JSON: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body for API clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ZoneError {
    /// Convert into the reply sent back on the same connection.
    pub fn into_reply(self) -> Reply {
        let (status, code, message, details) = match &self {
            // Kept terse so unauthorized callers learn nothing about the paths.
            ZoneError::AccessDenied => return Reply::not_allowed(),
            ZoneError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
                Some(path.clone()),
            ),
            ZoneError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                "Method not allowed".to_string(),
                None,
            ),
            ZoneError::MalformedBody(e) => (
                StatusCode::BAD_REQUEST,
                "MALFORMED_BODY",
                "Request body is not valid JSON".to_string(),
                Some(e.to_string()),
            ),
            ZoneError::CorruptState { path, source } => {
                tracing::error!(
                    path = %path.display(),
                    error = %source,
                    "Zone document is corrupt, manual repair required"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CORRUPT_STATE",
                    "The zone document could not be read".to_string(),
                    None,
                )
            }
            ZoneError::Storage(e) => {
                // Log the actual error but don't expose internals
                tracing::error!(error = %e, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                    None,
                )
            }
            ZoneError::Config(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Configuration error".to_string(),
                Some(e.to_string()),
            ),
            ZoneError::Startup(msg) | ZoneError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        Reply::json(status, serde_json::json!(body))
    }
}

impl IntoResponse for ZoneError {
    fn into_response(self) -> Response {
        self.into_reply().into_response()
    }
}

/// Result type alias for zone editor operations.
pub type ZoneResult<T> = Result<T, ZoneError>;
