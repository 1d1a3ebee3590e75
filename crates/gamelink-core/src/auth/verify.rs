use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::auth::{audit, identity, session, tokens, AccountDirectory};
use crate::error::LinkError;
use crate::models::audit_log::AuditAction;
use crate::models::token::TokenKind;

/// Inputs to a verify call, as presented by the game server.
#[derive(Debug, Clone, Default)]
pub struct VerifyParams {
    pub secret: String,
    pub external_identity: Option<String>,
    pub origin_address: Option<String>,
    pub origin_port: Option<i32>,
}

/// Successful verification result. `account_id` is the durable forum
/// identifier every later attribution must key on; the external identity
/// can change, the account cannot.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub account_id: i32,
    pub display_name: String,
    pub external_identity: Option<String>,
}

impl VerifyParams {
    fn origin(&self) -> Option<String> {
        self.origin_address.as_ref().map(|addr| match self.origin_port {
            Some(port) => format!("{}:{}", addr, port),
            None => addr.clone(),
        })
    }

    fn identity(&self) -> Option<&str> {
        self.external_identity.as_deref().filter(|g| !g.is_empty())
    }
}

/// Verify a presented token secret and open the resulting session.
///
/// Login tokens are consumed (one-time); API tokens act as multi-use
/// bearer credentials and are left active. Every failure mode after the
/// API-key gate — unknown secret, expired, already consumed, unresolvable
/// account — reports the same `InvalidOrExpiredToken`, so the caller
/// learns nothing about which case applied.
///
/// Verify without an external identity is a valid degenerate case: the
/// token is consumed and audited but no link or session is created.
pub async fn verify(
    db: &DatabaseConnection,
    directory: &dyn AccountDirectory,
    params: &VerifyParams,
) -> Result<VerifyOutcome, LinkError> {
    if params.secret.is_empty() {
        return Err(LinkError::BadRequest("Token required".to_string()));
    }

    let token = tokens::lookup_active(db, &params.secret)
        .await?
        .ok_or(LinkError::InvalidOrExpiredToken)?;

    // The original resolved the member with an inner join, folding a
    // missing member row into "invalid token". Same merge here.
    let account = directory
        .lookup(token.account_id)
        .await
        .ok_or(LinkError::InvalidOrExpiredToken)?;

    let origin = params.origin();
    let external = params.identity();

    // Consumption, audit, link and session commit together: a storage
    // failure anywhere rolls everything back and leaves the token active,
    // so the game server can retry the same secret.
    let txn = db.begin().await?;

    if TokenKind::parse(&token.kind) == Some(TokenKind::Login) {
        tokens::consume(&txn, token.id, origin.as_deref(), external).await?;
    }

    audit::record(
        &txn,
        account.id,
        &token.secret_prefix,
        AuditAction::Used,
        params.origin_address.as_deref(),
        external,
    )
    .await?;

    if let Some(guid) = external {
        identity::upsert(&txn, account.id, guid).await?;
        session::open(
            &txn,
            account.id,
            guid,
            params.origin_address.as_deref(),
            params.origin_port,
        )
        .await?;
    }

    txn.commit().await?;

    tracing::info!(
        account_id = account.id,
        kind = %token.kind,
        prefix = %token.secret_prefix,
        "token verified"
    );

    Ok(VerifyOutcome {
        account_id: account.id,
        display_name: account.display_name,
        external_identity: external.map(|s| s.to_string()),
    })
}

/// Session heartbeat. Always succeeds; a miss updates nothing.
pub async fn heartbeat(
    db: &DatabaseConnection,
    account_id: i32,
    external_identity: &str,
) -> Result<(), LinkError> {
    session::heartbeat(db, account_id, external_identity).await?;
    Ok(())
}

/// Explicit logout: close matching active sessions.
pub async fn logout(
    db: &DatabaseConnection,
    account_id: i32,
    external_identity: &str,
) -> Result<(), LinkError> {
    session::close(db, account_id, external_identity).await?;
    Ok(())
}
