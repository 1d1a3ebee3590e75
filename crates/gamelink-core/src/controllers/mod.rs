use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::AccountDirectory;
use crate::config::Config;

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub directory: Arc<dyn AccountDirectory>,
}

pub mod game;
pub mod tokens;

/// Best-effort caller IP from proxy headers.
pub(crate) fn extract_client_ip(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or("").trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        })
}
