use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::auth::audit;
use crate::auth::secret::{generate_secret, hash_secret, secret_prefix};
use crate::error::LinkError;
use crate::models::audit_log::AuditAction;
use crate::models::token::{self, TokenKind, TokenStatus};

/// A freshly issued token. The plaintext secret exists only in this value
/// and the single response it is serialized into; the store keeps a hash.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub secret: String,
    pub kind: TokenKind,
    pub expires_at: NaiveDateTime,
}

/// Metadata of a live token, safe for display. Never carries the secret.
#[derive(Debug, Clone)]
pub struct TokenMeta {
    pub secret_prefix: String,
    pub kind: TokenKind,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

/// Issue a new token, displacing any currently active token of the same
/// (account, kind).
///
/// The whole displace-and-insert step runs in one transaction so that two
/// concurrent issuances never both leave an active row: the later commit
/// wins and the earlier token ends up revoked.
pub async fn issue(
    db: &DatabaseConnection,
    account_id: i32,
    kind: TokenKind,
    ttl_secs: u64,
    len_bytes: usize,
    origin_ip: Option<&str>,
) -> Result<IssuedToken, LinkError> {
    let secret = generate_secret(len_bytes);
    let prefix = secret_prefix(&secret);
    let now = Utc::now().naive_utc();
    let expires_at = now + Duration::seconds(ttl_secs as i64);

    let txn = db.begin().await?;

    // Prior active tokens already past their ttl expire rather than revoke,
    // so the audit trail reflects what actually happened to them.
    token::Entity::update_many()
        .col_expr(
            token::Column::Status,
            Expr::value(TokenStatus::Expired.as_str()),
        )
        .filter(token::Column::AccountId.eq(account_id))
        .filter(token::Column::Kind.eq(kind.as_str()))
        .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
        .filter(token::Column::ExpiresAt.lte(now))
        .exec(&txn)
        .await?;

    token::Entity::update_many()
        .col_expr(
            token::Column::Status,
            Expr::value(TokenStatus::Revoked.as_str()),
        )
        .filter(token::Column::AccountId.eq(account_id))
        .filter(token::Column::Kind.eq(kind.as_str()))
        .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
        .exec(&txn)
        .await?;

    let model = token::ActiveModel {
        account_id: Set(account_id),
        secret_hash: Set(hash_secret(&secret)),
        secret_prefix: Set(prefix.clone()),
        kind: Set(kind.as_str().to_string()),
        created_at: Set(now),
        expires_at: Set(expires_at),
        used_at: Set(None),
        used_from: Set(None),
        external_identity: Set(None),
        status: Set(TokenStatus::Active.as_str().to_string()),
        ..Default::default()
    };
    model.insert(&txn).await?;

    audit::record(
        &txn,
        account_id,
        &prefix,
        AuditAction::Created,
        origin_ip,
        None,
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        account_id,
        kind = kind.as_str(),
        prefix = %prefix,
        "issued token"
    );

    Ok(IssuedToken {
        secret,
        kind,
        expires_at,
    })
}

/// Look up a token by its plaintext secret.
///
/// Only `active` rows whose expiry is still in the future are found. A
/// logically expired row the reaper has not swept yet is treated as
/// missing — correctness never depends on sweep timing.
pub async fn lookup_active(
    db: &DatabaseConnection,
    secret: &str,
) -> Result<Option<token::Model>, LinkError> {
    let now = Utc::now().naive_utc();
    let found = token::Entity::find()
        .filter(token::Column::SecretHash.eq(hash_secret(secret)))
        .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
        .filter(token::Column::ExpiresAt.gt(now))
        .one(db)
        .await?;
    Ok(found)
}

/// Consume a login token: `active → used`, stamping when, from where and
/// for which in-game identity.
///
/// The flip is a single conditional update keyed on `status = 'active'`.
/// Two racing verify calls therefore resolve to exactly one winner; the
/// loser sees zero affected rows and gets `InvalidOrExpiredToken`, the
/// same error as a plain miss. Generic over the connection so the caller
/// can run it inside a transaction together with the dependent writes.
pub async fn consume<C: ConnectionTrait>(
    conn: &C,
    token_id: i32,
    origin: Option<&str>,
    external_identity: Option<&str>,
) -> Result<(), LinkError> {
    let now = Utc::now().naive_utc();
    let result = token::Entity::update_many()
        .col_expr(
            token::Column::Status,
            Expr::value(TokenStatus::Used.as_str()),
        )
        .col_expr(token::Column::UsedAt, Expr::value(now))
        .col_expr(
            token::Column::UsedFrom,
            Expr::value(origin.map(|s| s.to_string())),
        )
        .col_expr(
            token::Column::ExternalIdentity,
            Expr::value(external_identity.map(|s| s.to_string())),
        )
        .filter(token::Column::Id.eq(token_id))
        .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(LinkError::InvalidOrExpiredToken);
    }
    Ok(())
}

/// Revoke every active token of the given (account, kind). Each row that
/// actually flips gets its own `revoked` audit entry. Returns the count.
pub async fn revoke(
    db: &DatabaseConnection,
    account_id: i32,
    kind: TokenKind,
    origin_ip: Option<&str>,
) -> Result<u64, LinkError> {
    let active = token::Entity::find()
        .filter(token::Column::AccountId.eq(account_id))
        .filter(token::Column::Kind.eq(kind.as_str()))
        .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
        .all(db)
        .await?;

    let mut revoked = 0u64;
    for row in active {
        // Per-row CAS: a concurrent consume or sweep may have taken the
        // row out of `active` since the read above.
        let result = token::Entity::update_many()
            .col_expr(
                token::Column::Status,
                Expr::value(TokenStatus::Revoked.as_str()),
            )
            .filter(token::Column::Id.eq(row.id))
            .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
            .exec(db)
            .await?;

        if result.rows_affected == 1 {
            audit::record(
                db,
                account_id,
                &row.secret_prefix,
                AuditAction::Revoked,
                origin_ip,
                None,
            )
            .await?;
            revoked += 1;
        }
    }

    if revoked > 0 {
        tracing::info!(account_id, kind = kind.as_str(), revoked, "revoked tokens");
    }
    Ok(revoked)
}

/// Display metadata of the currently live token for (account, kind), if any.
pub async fn active_token_meta(
    db: &DatabaseConnection,
    account_id: i32,
    kind: TokenKind,
) -> Result<Option<TokenMeta>, LinkError> {
    let now = Utc::now().naive_utc();
    let found = token::Entity::find()
        .filter(token::Column::AccountId.eq(account_id))
        .filter(token::Column::Kind.eq(kind.as_str()))
        .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
        .filter(token::Column::ExpiresAt.gt(now))
        .order_by_desc(token::Column::CreatedAt)
        .one(db)
        .await?;

    Ok(found.map(|row| TokenMeta {
        secret_prefix: row.secret_prefix,
        kind,
        created_at: row.created_at,
        expires_at: row.expires_at,
    }))
}
