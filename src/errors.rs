//! Structured error types shared by every handler and the report pipeline.
//!
//! Each error carries a machine-readable code and maps to one HTTP status so
//! API clients can branch without parsing messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::StoreError;

/// Structured error payload returned to API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error types with proper categorization.
#[derive(Debug)]
pub enum AppError {
    // Authentication (401)
    MissingCredential,
    InvalidCredential(String),

    // Authorization (403)
    Forbidden(String),

    // Validation (400)
    InvalidInput { field: String, reason: String },

    // Not found (404)
    UserNotFound(String),
    RecordNotFound { entity: &'static str, id: i64 },

    // Conflict (409)
    UserAlreadyExists(String),

    // Record store failure (500) - fatal to the current request, no retry
    Store(String),

    // Report composer rejected a malformed document (500)
    Layout(String),

    // Scholar metrics service unreachable (502)
    ScholarUnavailable(String),

    // Generic wrapper for external errors (500)
    Internal(anyhow::Error),
}

impl AppError {
    /// Get error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::InvalidCredential(_) => "INVALID_CREDENTIAL",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            Self::UserAlreadyExists(_) => "USER_ALREADY_EXISTS",
            Self::Store(_) => "STORE_ERROR",
            Self::Layout(_) => "LAYOUT_ERROR",
            Self::ScholarUnavailable(_) => "SCHOLAR_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredential | Self::InvalidCredential(_) => StatusCode::UNAUTHORIZED,

            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,

            Self::UserNotFound(_) | Self::RecordNotFound { .. } => StatusCode::NOT_FOUND,

            Self::UserAlreadyExists(_) => StatusCode::CONFLICT,

            Self::ScholarUnavailable(_) => StatusCode::BAD_GATEWAY,

            Self::Store(_) | Self::Layout(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get detailed error message
    pub fn message(&self) -> String {
        match self {
            Self::MissingCredential => "Session token missing".to_string(),
            Self::InvalidCredential(msg) => format!("Invalid session: {msg}"),
            Self::Forbidden(msg) => format!("Forbidden: {msg}"),
            Self::InvalidInput { field, reason } => {
                format!("Invalid input for field '{field}': {reason}")
            }
            Self::UserNotFound(who) => format!("User not found: {who}"),
            Self::RecordNotFound { entity, id } => format!("{entity} record not found: {id}"),
            Self::UserAlreadyExists(email) => {
                format!("User already exists, kindly login: {email}")
            }
            Self::Store(msg) => format!("Record store error: {msg}"),
            Self::Layout(msg) => format!("Report layout error: {msg}"),
            Self::ScholarUnavailable(msg) => format!("Scholar metrics unavailable: {msg}"),
            Self::Internal(err) => format!("Internal error: {err}"),
        }
    }

    /// Convert to structured error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message(),
            details: None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_response();

        (status, Json(body)).into_response()
    }
}

/// Type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;
