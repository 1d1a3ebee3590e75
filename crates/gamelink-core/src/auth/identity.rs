use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::error::LinkError;
use crate::models::identity;

/// Upsert the account ↔ in-game identity link.
///
/// Keyed on the unique `external_identity`: first sight inserts a verified
/// row; a repeat refreshes `verified` and `last_seen` but keeps the
/// existing account binding — a GUID already linked to another account is
/// not silently re-bound.
pub async fn upsert<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    external_identity: &str,
) -> Result<(), LinkError> {
    let now = Utc::now().naive_utc();
    let model = identity::ActiveModel {
        account_id: Set(account_id),
        external_identity: Set(external_identity.to_string()),
        verified: Set(true),
        created_at: Set(now),
        last_seen: Set(now),
        ..Default::default()
    };

    identity::Entity::insert(model)
        .on_conflict(
            OnConflict::column(identity::Column::ExternalIdentity)
                .update_columns([identity::Column::Verified, identity::Column::LastSeen])
                .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

/// All identity links for an account, newest first.
pub async fn links_for_account(
    db: &DatabaseConnection,
    account_id: i32,
) -> Result<Vec<identity::Model>, LinkError> {
    let rows = identity::Entity::find()
        .filter(identity::Column::AccountId.eq(account_id))
        .order_by_desc(identity::Column::LastSeen)
        .all(db)
        .await?;
    Ok(rows)
}

/// Look up the link for a specific in-game identity.
pub async fn find_by_external(
    db: &DatabaseConnection,
    external_identity: &str,
) -> Result<Option<identity::Model>, LinkError> {
    let row = identity::Entity::find()
        .filter(identity::Column::ExternalIdentity.eq(external_identity))
        .one(db)
        .await?;
    Ok(row)
}
