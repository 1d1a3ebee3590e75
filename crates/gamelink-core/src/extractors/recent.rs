use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// `?limit=` query parameter for the recent-history read endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct RecentQuery {
    /// Number of items to return (default: 10, max: 50)
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    10
}

impl Default for RecentQuery {
    fn default() -> Self {
        RecentQuery { limit: 10 }
    }
}

impl RecentQuery {
    /// Clamp limit to max 50.
    pub fn clamped(&self) -> u64 {
        self.limit.min(50)
    }
}

impl<S> FromRequestParts<S> for RecentQuery
where
    S: Send + Sync,
{
    type Rejection = crate::error::LinkError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or("");
        let recent: RecentQuery = serde_urlencoded::from_str(query).unwrap_or_default();
        Ok(recent)
    }
}
