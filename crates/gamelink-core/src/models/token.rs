use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Issued link token. Rows are never deleted; terminal states are kept
/// for the audit trail.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The forum account this token belongs to
    pub account_id: i32,

    /// SHA-256 hex of the plaintext secret; the plaintext is never stored
    #[sea_orm(unique)]
    pub secret_hash: String,

    /// First 8 hex chars of the plaintext, for display and audit correlation
    pub secret_prefix: String,

    /// Token kind: "login" (one-time) or "api" (multi-use bearer)
    pub kind: String,

    pub created_at: NaiveDateTime,

    pub expires_at: NaiveDateTime,

    /// When the token was consumed (login tokens only)
    pub used_at: Option<NaiveDateTime>,

    /// "ip:port" origin of the consuming game server
    pub used_from: Option<String>,

    /// In-game identity bound at consumption time
    pub external_identity: Option<String>,

    /// "active", "used", "expired" or "revoked"
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Token kind: one-time login bootstrap or durable API credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Login,
    Api,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Login => "login",
            TokenKind::Api => "api",
        }
    }

    /// Parse a kind string from the API boundary. Anything but the two
    /// recognized values is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "login" => Some(TokenKind::Login),
            "api" => Some(TokenKind::Api),
            _ => None,
        }
    }
}

/// Token status state machine: `active` is the only non-terminal state.
///
/// `active → used` (consumed by verification), `active → expired`
/// (reaper or lazy expiry), `active → revoked` (displaced by a new
/// issuance or explicit revocation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Active,
    Used,
    Expired,
    Revoked,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Active => "active",
            TokenStatus::Used => "used",
            TokenStatus::Expired => "expired",
            TokenStatus::Revoked => "revoked",
        }
    }
}
