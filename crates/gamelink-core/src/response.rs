use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorDetail, LinkError};

/// Uniform response envelope for every gamelink endpoint.
///
/// Exactly one of `data` and `error` is present:
/// ```json
/// { "success": true,  "data": { ... } }
/// { "success": false, "error": { "code": "...", "message": "..." } }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failure envelope carrying the error's stable code.
    pub fn failure(err: &LinkError) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorDetail {
                code: err.error_code().to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Render with transport-level success regardless of the envelope's
    /// own verdict. The game boundary uses this: a game server gets a
    /// single success/failure signal in the body, never an HTTP failure,
    /// for anything past the API-key gate.
    pub fn into_envelope(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, axum::Json(self)).into_response()
    }
}
