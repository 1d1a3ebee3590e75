use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::ApiResponse;

/// Standard error type for the gamelink core.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Server-to-server trust failure. Always checked before any token
    /// logic and surfaced as a transport-level 401, never an envelope.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Deliberately covers not-found, expired and already-consumed so a
    /// caller cannot tell which case applied.
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Invalid token kind: {0}")]
    InvalidKind(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl LinkError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LinkError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LinkError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            LinkError::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            LinkError::InvalidKind(_) => StatusCode::BAD_REQUEST,
            LinkError::UnknownAction(_) => StatusCode::BAD_REQUEST,
            LinkError::BadRequest(_) => StatusCode::BAD_REQUEST,
            LinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LinkError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            LinkError::Unauthorized(_) => "UNAUTHORIZED",
            LinkError::InvalidApiKey => "INVALID_API_KEY",
            LinkError::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            LinkError::InvalidKind(_) => "INVALID_KIND",
            LinkError::UnknownAction(_) => "UNKNOWN_ACTION",
            LinkError::BadRequest(_) => "BAD_REQUEST",
            LinkError::Internal(_) => "INTERNAL_ERROR",
            LinkError::Database(_) => "STORAGE_UNAVAILABLE",
        }
    }
}

/// Error detail for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl axum::response::IntoResponse for LinkError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ApiResponse::<()>::failure(&self);
        (status, axum::Json(body)).into_response()
    }
}
