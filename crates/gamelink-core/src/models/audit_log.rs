use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only token lifecycle history. No update or delete path exists.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub account_id: i32,

    /// First 8 chars of the token secret; never the full value
    pub token_prefix: String,

    /// "created", "used", "expired" or "revoked"
    pub action: String,

    pub ip_address: Option<String>,

    pub external_identity: Option<String>,

    pub log_time: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Token lifecycle event recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Created,
    Used,
    Expired,
    Revoked,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Created => "created",
            AuditAction::Used => "used",
            AuditAction::Expired => "expired",
            AuditAction::Revoked => "revoked",
        }
    }
}
