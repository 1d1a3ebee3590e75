use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::verify::{self, VerifyParams};
use crate::error::LinkError;
use crate::response::ApiResponse;

use super::AppState;

// ── Request / Response types ──

/// Server-to-server request envelope. `action` selects the sub-operation;
/// the shared key may ride in the `X-Api-Key` header or the body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GameRequest {
    pub action: String,
    pub api_key: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub external_identity: Option<String>,
    #[serde(default)]
    pub origin_address: Option<String>,
    #[serde(default)]
    pub origin_port: Option<i32>,
    #[serde(default)]
    pub account_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    /// Durable forum account ID. All later attribution keys on this,
    /// never on the external identity alone.
    pub account_id: i32,
    pub display_name: String,
    pub external_identity: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    pub ok: bool,
}

/// Closed set of game-server sub-operations. The action string is parsed
/// once at the boundary; everything behind it is exhaustive enum dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameAction {
    Verify,
    Heartbeat,
    Logout,
}

impl GameAction {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "verify" => Some(GameAction::Verify),
            "heartbeat" => Some(GameAction::Heartbeat),
            "logout" => Some(GameAction::Logout),
            _ => None,
        }
    }
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(game_api))
}

/// Business errors at this boundary become HTTP-200 error envelopes: the
/// game server gets a single success/failure signal, never a transport
/// failure. Only the API-key gate and storage failures surface as non-200.
fn envelope(err: LinkError) -> Response {
    ApiResponse::<()>::failure(&err).into_envelope()
}

fn outcome<T: Serialize>(result: Result<T, LinkError>) -> Response {
    match result {
        Ok(data) => ApiResponse::success(data).into_envelope(),
        Err(err @ (LinkError::Database(_) | LinkError::Internal(_))) => err.into_response(),
        Err(err) => envelope(err),
    }
}

// ── Handler ──

/// Server-to-server verification endpoint, dispatched by `action`.
#[utoipa::path(
    post,
    path = "/api/game",
    request_body = GameRequest,
    responses(
        (status = 200, description = "Success or business-error envelope", body = ApiResponse<VerifyResponse>),
        (status = 401, description = "Missing or invalid API key")
    ),
    security(("api_key" = [])),
    tag = "game"
)]
pub async fn game_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Trust boundary: the shared key is checked before any token logic,
    // and before the body is even parsed. An unconfigured (empty) key
    // rejects everything, fail closed.
    let configured = state.config.game_api_key.as_str();
    let header_key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    let header_ok = !configured.is_empty() && header_key == Some(configured);

    let payload: GameRequest = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        // A malformed body from an unauthorized caller is a key failure,
        // not a parse error.
        Err(_) if !header_ok => return LinkError::InvalidApiKey.into_response(),
        Err(e) => return LinkError::BadRequest(format!("Invalid JSON: {}", e)).into_response(),
    };

    let body_key_ok = !configured.is_empty() && payload.api_key.as_deref() == Some(configured);
    if !header_ok && !body_key_ok {
        return LinkError::InvalidApiKey.into_response();
    }

    let action = match GameAction::parse(&payload.action) {
        Some(action) => action,
        None => return envelope(LinkError::UnknownAction(payload.action)),
    };

    match action {
        GameAction::Verify => {
            let params = VerifyParams {
                secret: payload.token.unwrap_or_default(),
                external_identity: payload.external_identity,
                origin_address: payload.origin_address,
                origin_port: payload.origin_port,
            };
            let result = verify::verify(&state.db, state.directory.as_ref(), &params)
                .await
                .map(|o| VerifyResponse {
                    account_id: o.account_id,
                    display_name: o.display_name,
                    external_identity: o.external_identity,
                });
            outcome(result)
        }
        GameAction::Heartbeat => {
            let account_id = payload.account_id.unwrap_or_default();
            let guid = payload.external_identity.unwrap_or_default();
            // Best effort: a miss (or absent parameters) is still success.
            let result = verify::heartbeat(&state.db, account_id, &guid)
                .await
                .map(|_| AckResponse { ok: true });
            outcome(result)
        }
        GameAction::Logout => {
            let account_id = payload.account_id.unwrap_or_default();
            let guid = payload.external_identity.unwrap_or_default();
            let result = verify::logout(&state.db, account_id, &guid)
                .await
                .map(|_| AckResponse { ok: true });
            outcome(result)
        }
    }
}
