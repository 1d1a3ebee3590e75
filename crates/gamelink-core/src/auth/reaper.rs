use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};

use crate::auth::audit;
use crate::config::TokenConfig;
use crate::error::LinkError;
use crate::models::audit_log::AuditAction;
use crate::models::session::{self, SessionStatus};
use crate::models::token::{self, TokenStatus};

/// What one sweep actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub tokens_expired: u64,
    pub sessions_closed: u64,
}

/// Background sweep enforcing time-based state transitions.
///
/// Correctness never depends on it: `lookup_active` already ignores
/// logically expired rows. The reaper keeps the stored state and the
/// audit trail in line with the clock.
pub struct Reaper {
    db: DatabaseConnection,
    stale_window_secs: u64,
    interval_secs: u64,
}

impl Reaper {
    pub fn new(db: DatabaseConnection, config: &TokenConfig) -> Self {
        Reaper {
            db,
            stale_window_secs: config.session_stale_secs,
            interval_secs: config.reaper_interval_secs,
        }
    }

    /// Run both sweeps once. Idempotent: every flip is a CAS that only
    /// fires on rows still `active`, so rerunning immediately changes
    /// nothing and racing live traffic is safe.
    pub async fn run_once(&self) -> Result<SweepStats, LinkError> {
        let now = Utc::now().naive_utc();
        let mut stats = SweepStats::default();

        // Sweep 1: stale active tokens → expired, one audit entry per
        // row actually flipped. Flip and audit entry commit together, so
        // a terminal row always has its `expired` entry.
        let stale_tokens = token::Entity::find()
            .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
            .filter(token::Column::ExpiresAt.lt(now))
            .all(&self.db)
            .await?;

        for row in stale_tokens {
            let txn = self.db.begin().await?;
            let result = token::Entity::update_many()
                .col_expr(
                    token::Column::Status,
                    Expr::value(TokenStatus::Expired.as_str()),
                )
                .filter(token::Column::Id.eq(row.id))
                .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
                .exec(&txn)
                .await?;

            if result.rows_affected == 1 {
                audit::record(
                    &txn,
                    row.account_id,
                    &row.secret_prefix,
                    AuditAction::Expired,
                    None,
                    None,
                )
                .await?;
                stats.tokens_expired += 1;
            }
            txn.commit().await?;
        }

        // Sweep 2: sessions silent past the stale window → offline.
        let cutoff = now - Duration::seconds(self.stale_window_secs as i64);
        let result = session::Entity::update_many()
            .col_expr(
                session::Column::Status,
                Expr::value(SessionStatus::Offline.as_str()),
            )
            .col_expr(session::Column::LogoutTime, Expr::value(Some(now)))
            .filter(session::Column::Status.eq(SessionStatus::Active.as_str()))
            .filter(session::Column::LastSeen.lt(cutoff))
            .exec(&self.db)
            .await?;
        stats.sessions_closed = result.rows_affected;

        if stats.tokens_expired > 0 || stats.sessions_closed > 0 {
            tracing::info!(
                tokens_expired = stats.tokens_expired,
                sessions_closed = stats.sessions_closed,
                "reaper sweep complete"
            );
        }

        Ok(stats)
    }

    /// Spawn the sweep loop on its own task. A failed sweep is logged and
    /// retried next tick; it never propagates and never blocks requests.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(self.interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if let Err(e) = self.run_once().await {
                    tracing::warn!(error = %e, "reaper sweep failed; retrying next tick");
                }
            }
        })
    }
}
