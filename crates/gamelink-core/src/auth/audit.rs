use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::error::LinkError;
use crate::models::audit_log::{self, AuditAction};

/// Append one audit entry. Works inside or outside a transaction.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    token_prefix: &str,
    action: AuditAction,
    ip_address: Option<&str>,
    external_identity: Option<&str>,
) -> Result<(), LinkError> {
    let entry = audit_log::ActiveModel {
        account_id: Set(account_id),
        token_prefix: Set(token_prefix.to_string()),
        action: Set(action.as_str().to_string()),
        ip_address: Set(ip_address.map(|s| s.to_string())),
        external_identity: Set(external_identity.map(|s| s.to_string())),
        log_time: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    entry.insert(conn).await?;
    Ok(())
}

/// Audit history for an account, newest first.
pub async fn history(
    db: &DatabaseConnection,
    account_id: i32,
    limit: u64,
) -> Result<Vec<audit_log::Model>, LinkError> {
    let entries = audit_log::Entity::find()
        .filter(audit_log::Column::AccountId.eq(account_id))
        .order_by_desc(audit_log::Column::LogTime)
        .order_by_desc(audit_log::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(entries)
}
