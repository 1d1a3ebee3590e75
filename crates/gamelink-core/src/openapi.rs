use utoipa::OpenApi;

use crate::controllers::game::{AckResponse, GameRequest, VerifyResponse};
use crate::controllers::tokens::{
    AuditEntryResponse, IdentityLinkResponse, IssueTokenRequest, IssuedTokenResponse,
    RevokeTokenRequest, RevokedResponse, SessionResponse, TokenMetaResponse,
};

/// Auto-generated OpenAPI documentation for the gamelink API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gamelink API",
        version = "0.3.2",
        description = "Token issuance, verification and session tracking for linking forum accounts to in-game identities."
    ),
    paths(
        crate::controllers::tokens::issue_token,
        crate::controllers::tokens::revoke_token,
        crate::controllers::tokens::current_token,
        crate::controllers::tokens::recent_sessions,
        crate::controllers::tokens::audit_history,
        crate::controllers::tokens::identity_links,
        crate::controllers::game::game_api,
    ),
    components(
        schemas(
            IssueTokenRequest,
            IssuedTokenResponse,
            RevokeTokenRequest,
            RevokedResponse,
            TokenMetaResponse,
            SessionResponse,
            AuditEntryResponse,
            IdentityLinkResponse,
            GameRequest,
            VerifyResponse,
            AckResponse,
        )
    ),
    tags(
        (name = "tokens", description = "Account-facing token management"),
        (name = "game", description = "Server-to-server verification")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the JWT bearer and shared API key security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("x-api-key"),
                    ),
                ),
            );
        }
    }
}
