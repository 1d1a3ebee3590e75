use axum::{
    extract::{Query, State},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::tokens;
use crate::error::LinkError;
use crate::extractors::{AuthAccount, Json, RecentQuery};
use crate::models::token::TokenKind;
use crate::models::{audit_log, identity, session};
use crate::response::ApiResponse;

use super::{extract_client_ip, AppState};

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueTokenRequest {
    /// Token kind: "login" or "api"
    pub kind: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssuedTokenResponse {
    /// The plaintext secret. This is the only response it ever appears in.
    pub secret: String,
    pub kind: String,
    pub expires_at: NaiveDateTime,
    pub expires_in_secs: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevokeTokenRequest {
    /// Token kind to revoke: "login" or "api"
    pub kind: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevokedResponse {
    pub revoked: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct KindQuery {
    pub kind: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenMetaResponse {
    /// First 8 chars of the secret, for recognizing the token
    pub secret_prefix: String,
    pub kind: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: i32,
    pub external_identity: String,
    pub origin_address: Option<String>,
    pub origin_port: Option<i32>,
    pub login_time: NaiveDateTime,
    pub last_seen: NaiveDateTime,
    pub logout_time: Option<NaiveDateTime>,
    pub status: String,
}

impl From<session::Model> for SessionResponse {
    fn from(row: session::Model) -> Self {
        SessionResponse {
            id: row.id,
            external_identity: row.external_identity,
            origin_address: row.origin_address,
            origin_port: row.origin_port,
            login_time: row.login_time,
            last_seen: row.last_seen,
            logout_time: row.logout_time,
            status: row.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditEntryResponse {
    pub token_prefix: String,
    pub action: String,
    pub ip_address: Option<String>,
    pub external_identity: Option<String>,
    pub log_time: NaiveDateTime,
}

impl From<audit_log::Model> for AuditEntryResponse {
    fn from(row: audit_log::Model) -> Self {
        AuditEntryResponse {
            token_prefix: row.token_prefix,
            action: row.action,
            ip_address: row.ip_address,
            external_identity: row.external_identity,
            log_time: row.log_time,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IdentityLinkResponse {
    pub external_identity: String,
    pub verified: bool,
    pub created_at: NaiveDateTime,
    pub last_seen: NaiveDateTime,
}

impl From<identity::Model> for IdentityLinkResponse {
    fn from(row: identity::Model) -> Self {
        IdentityLinkResponse {
            external_identity: row.external_identity,
            verified: row.verified,
            created_at: row.created_at,
            last_seen: row.last_seen,
        }
    }
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(issue_token))
        .route("/revoke", post(revoke_token))
        .route("/current", get(current_token))
        .route("/sessions", get(recent_sessions))
        .route("/history", get(audit_history))
        .route("/identity", get(identity_links))
}

// ── Helpers ──

fn parse_kind(kind: &str) -> Result<TokenKind, LinkError> {
    TokenKind::parse(kind).ok_or_else(|| LinkError::InvalidKind(kind.to_string()))
}

fn ttl_for(state: &AppState, kind: TokenKind) -> u64 {
    match kind {
        TokenKind::Login => state.config.tokens.login_ttl_secs,
        TokenKind::Api => state.config.tokens.api_ttl_secs,
    }
}

/// The account must resolve through the directory: "authenticated,
/// non-guest" is the external collaborator's call, not ours.
async fn require_account(state: &AppState, account_id: i32) -> Result<(), LinkError> {
    state
        .directory
        .lookup(account_id)
        .await
        .map(|_| ())
        .ok_or_else(|| LinkError::Unauthorized("Unknown account".to_string()))
}

// ── Handlers ──

/// Issue a new token, displacing any active one of the same kind.
#[utoipa::path(
    post,
    path = "/api/tokens",
    request_body = IssueTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<IssuedTokenResponse>),
        (status = 400, description = "Unrecognized kind"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "tokens"
)]
pub async fn issue_token(
    State(state): State<AppState>,
    AuthAccount(account_id): AuthAccount,
    headers: axum::http::HeaderMap,
    Json(payload): Json<IssueTokenRequest>,
) -> Result<ApiResponse<IssuedTokenResponse>, LinkError> {
    require_account(&state, account_id).await?;
    let kind = parse_kind(&payload.kind)?;
    let ttl = ttl_for(&state, kind);
    let ip = extract_client_ip(&headers);

    let issued = tokens::issue(
        &state.db,
        account_id,
        kind,
        ttl,
        state.config.tokens.token_length_bytes,
        ip.as_deref(),
    )
    .await?;

    let expires_in_secs = (issued.expires_at - Utc::now().naive_utc()).num_seconds();
    Ok(ApiResponse::success(IssuedTokenResponse {
        secret: issued.secret,
        kind: issued.kind.as_str().to_string(),
        expires_at: issued.expires_at,
        expires_in_secs,
    }))
}

/// Revoke all active tokens of a kind.
#[utoipa::path(
    post,
    path = "/api/tokens/revoke",
    request_body = RevokeTokenRequest,
    responses(
        (status = 200, description = "Tokens revoked", body = ApiResponse<RevokedResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "tokens"
)]
pub async fn revoke_token(
    State(state): State<AppState>,
    AuthAccount(account_id): AuthAccount,
    headers: axum::http::HeaderMap,
    Json(payload): Json<RevokeTokenRequest>,
) -> Result<ApiResponse<RevokedResponse>, LinkError> {
    require_account(&state, account_id).await?;
    let kind = parse_kind(&payload.kind)?;
    let ip = extract_client_ip(&headers);

    let revoked = tokens::revoke(&state.db, account_id, kind, ip.as_deref()).await?;
    Ok(ApiResponse::success(RevokedResponse { revoked }))
}

/// Metadata of the currently active token of a kind. Never the secret.
#[utoipa::path(
    get,
    path = "/api/tokens/current",
    params(("kind" = String, Query, description = "Token kind: login or api")),
    responses(
        (status = 200, description = "Active token metadata, or null", body = ApiResponse<TokenMetaResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "tokens"
)]
pub async fn current_token(
    State(state): State<AppState>,
    AuthAccount(account_id): AuthAccount,
    Query(query): Query<KindQuery>,
) -> Result<ApiResponse<Option<TokenMetaResponse>>, LinkError> {
    require_account(&state, account_id).await?;
    let kind = parse_kind(&query.kind)?;

    let meta = tokens::active_token_meta(&state.db, account_id, kind).await?;
    Ok(ApiResponse::success(meta.map(|m| TokenMetaResponse {
        secret_prefix: m.secret_prefix,
        kind: m.kind.as_str().to_string(),
        created_at: m.created_at,
        expires_at: m.expires_at,
    })))
}

/// Recent game sessions for the account, newest first.
#[utoipa::path(
    get,
    path = "/api/tokens/sessions",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent sessions", body = ApiResponse<Vec<SessionResponse>>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "tokens"
)]
pub async fn recent_sessions(
    State(state): State<AppState>,
    AuthAccount(account_id): AuthAccount,
    query: RecentQuery,
) -> Result<ApiResponse<Vec<SessionResponse>>, LinkError> {
    require_account(&state, account_id).await?;
    let rows = crate::auth::session::recent(&state.db, account_id, query.clamped()).await?;
    Ok(ApiResponse::success(
        rows.into_iter().map(SessionResponse::from).collect(),
    ))
}

/// Token lifecycle history for the account, newest first.
#[utoipa::path(
    get,
    path = "/api/tokens/history",
    params(RecentQuery),
    responses(
        (status = 200, description = "Audit entries", body = ApiResponse<Vec<AuditEntryResponse>>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "tokens"
)]
pub async fn audit_history(
    State(state): State<AppState>,
    AuthAccount(account_id): AuthAccount,
    query: RecentQuery,
) -> Result<ApiResponse<Vec<AuditEntryResponse>>, LinkError> {
    require_account(&state, account_id).await?;
    let rows = crate::auth::audit::history(&state.db, account_id, query.clamped()).await?;
    Ok(ApiResponse::success(
        rows.into_iter().map(AuditEntryResponse::from).collect(),
    ))
}

/// Linked in-game identities for the account.
#[utoipa::path(
    get,
    path = "/api/tokens/identity",
    responses(
        (status = 200, description = "Identity links", body = ApiResponse<Vec<IdentityLinkResponse>>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "tokens"
)]
pub async fn identity_links(
    State(state): State<AppState>,
    AuthAccount(account_id): AuthAccount,
) -> Result<ApiResponse<Vec<IdentityLinkResponse>>, LinkError> {
    require_account(&state, account_id).await?;
    let rows = crate::auth::identity::links_for_account(&state.db, account_id).await?;
    Ok(ApiResponse::success(
        rows.into_iter().map(IdentityLinkResponse::from).collect(),
    ))
}
