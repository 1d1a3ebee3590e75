use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tracked in-game session, opened by a successful verification.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The forum account playing this session
    pub account_id: i32,

    /// In-game identity (GUID) active during the session
    pub external_identity: String,

    /// Game server address
    pub origin_address: Option<String>,

    pub origin_port: Option<i32>,

    pub login_time: NaiveDateTime,

    /// Refreshed by heartbeats; never earlier than `login_time`
    pub last_seen: NaiveDateTime,

    pub logout_time: Option<NaiveDateTime>,

    /// "active" or "offline"
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Session status: active → offline exactly once, by logout or the reaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Offline,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Offline => "offline",
        }
    }
}
