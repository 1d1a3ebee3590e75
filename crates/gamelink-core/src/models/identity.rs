use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Durable account ↔ in-game identity mapping.
///
/// An account may link several identities over time, but a given
/// identity maps to at most one account (unique key below).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "identities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub account_id: i32,

    #[sea_orm(unique)]
    pub external_identity: String,

    pub verified: bool,

    pub created_at: NaiveDateTime,

    pub last_seen: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
