use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::LinkError;

/// JSON extractor whose rejection is the standard error envelope.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn issue(Json(payload): Json<IssueTokenRequest>) -> impl IntoResponse {
///     // payload is deserialized from the request body
/// }
/// ```
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = LinkError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| LinkError::BadRequest(format!("Failed to read body: {}", e)))?;

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| LinkError::BadRequest(format!("Invalid JSON: {}", e)))?;

        Ok(Json(value))
    }
}

impl<T: serde::Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        let bytes = serde_json::to_vec(&self.0).unwrap_or_default();
        (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response()
    }
}
