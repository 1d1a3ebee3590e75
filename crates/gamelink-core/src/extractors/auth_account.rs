use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::auth::jwt;
use crate::config::Config;
use crate::error::LinkError;

/// The authenticated forum account behind a request, resolved from the
/// forum-minted bearer token.
///
/// ```rust,ignore
/// async fn handler(AuthAccount(account_id): AuthAccount) -> impl IntoResponse {
///     // account_id is the validated forum account
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthAccount(pub i32);

fn bearer(parts: &Parts) -> Result<&str, LinkError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| LinkError::Unauthorized("Missing bearer token".to_string()))
}

impl<S> FromRequestParts<S> for AuthAccount
where
    S: Send + Sync,
{
    type Rejection = LinkError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer(parts)?;

        // Arc<Config> lives in request extensions (cheap clone per request)
        let config = parts
            .extensions
            .get::<Arc<Config>>()
            .ok_or_else(|| LinkError::Internal("Config missing from request".to_string()))?;

        let account_id = jwt::verify_bearer(token, &config.jwt_secret)?;
        Ok(AuthAccount(account_id))
    }
}
