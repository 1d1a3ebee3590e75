use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::error::LinkError;
use crate::models::session::{self, SessionStatus};

/// Open a new active session for a verified identity. Generic over the
/// connection so verification can open it in the same transaction as the
/// token consumption.
pub async fn open<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    external_identity: &str,
    origin_address: Option<&str>,
    origin_port: Option<i32>,
) -> Result<session::Model, LinkError> {
    let now = Utc::now().naive_utc();
    let model = session::ActiveModel {
        account_id: Set(account_id),
        external_identity: Set(external_identity.to_string()),
        origin_address: Set(origin_address.map(|s| s.to_string())),
        origin_port: Set(origin_port),
        login_time: Set(now),
        last_seen: Set(now),
        logout_time: Set(None),
        status: Set(SessionStatus::Active.as_str().to_string()),
        ..Default::default()
    };
    let row = model.insert(conn).await?;
    tracing::info!(account_id, external_identity, "session opened");
    Ok(row)
}

/// Refresh `last_seen` on the matching active session rows.
///
/// Heartbeats are best-effort: zero matches is still success, and a miss
/// never creates a session.
pub async fn heartbeat(
    db: &DatabaseConnection,
    account_id: i32,
    external_identity: &str,
) -> Result<u64, LinkError> {
    let now = Utc::now().naive_utc();
    let result = session::Entity::update_many()
        .col_expr(session::Column::LastSeen, Expr::value(now))
        .filter(session::Column::AccountId.eq(account_id))
        .filter(session::Column::ExternalIdentity.eq(external_identity))
        .filter(session::Column::Status.eq(SessionStatus::Active.as_str()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Close the matching active session rows: `active → offline`, stamping
/// `logout_time`. The status filter makes the flip one-way.
pub async fn close(
    db: &DatabaseConnection,
    account_id: i32,
    external_identity: &str,
) -> Result<u64, LinkError> {
    let now = Utc::now().naive_utc();
    let result = session::Entity::update_many()
        .col_expr(
            session::Column::Status,
            Expr::value(SessionStatus::Offline.as_str()),
        )
        .col_expr(session::Column::LogoutTime, Expr::value(Some(now)))
        .filter(session::Column::AccountId.eq(account_id))
        .filter(session::Column::ExternalIdentity.eq(external_identity))
        .filter(session::Column::Status.eq(SessionStatus::Active.as_str()))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        tracing::info!(account_id, external_identity, "session closed");
    }
    Ok(result.rows_affected)
}

/// Most recent sessions for an account, newest login first. Display only.
pub async fn recent(
    db: &DatabaseConnection,
    account_id: i32,
    limit: u64,
) -> Result<Vec<session::Model>, LinkError> {
    let rows = session::Entity::find()
        .filter(session::Column::AccountId.eq(account_id))
        .order_by_desc(session::Column::LoginTime)
        .order_by_desc(session::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(rows)
}
