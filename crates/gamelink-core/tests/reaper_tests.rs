// Background sweep tests: expiry, stale sessions, idempotence.

use gamelink_core::auth::{tokens, Reaper};
use gamelink_core::config::TokenConfig;
use gamelink_core::models::audit_log;
use gamelink_core::models::session::{self, SessionStatus};
use gamelink_core::models::token::{self, TokenKind, TokenStatus};
use gamelink_core::testing::TestApp;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;

fn reaper_with(app: &TestApp, stale_secs: u64) -> Reaper {
    let config = TokenConfig {
        session_stale_secs: stale_secs,
        ..TokenConfig::default()
    };
    Reaper::new(app.db.clone(), &config)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sweep_expires_stale_tokens_with_audit() {
    let app = TestApp::new().await;

    tokens::issue(&app.db, 42, TokenKind::Login, 0, 16, None)
        .await
        .unwrap();
    let live = app.issue_token(7, "login").await;

    let stats = reaper_with(&app, 300).run_once().await.unwrap();
    assert_eq!(stats.tokens_expired, 1);

    let expired = token::Entity::find()
        .filter(token::Column::AccountId.eq(42))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(expired.status, TokenStatus::Expired.as_str());

    // One expired audit entry, exactly once
    let entries = audit_log::Entity::find()
        .filter(audit_log::Column::AccountId.eq(42))
        .filter(audit_log::Column::Action.eq("expired"))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);

    // The live token is untouched and still verifies
    let res = app
        .game_call(json!({"action": "verify", "token": live}))
        .await;
    assert!(res.is_success());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sweep_is_idempotent() {
    let app = TestApp::new().await;
    tokens::issue(&app.db, 42, TokenKind::Login, 0, 16, None)
        .await
        .unwrap();

    let reaper = reaper_with(&app, 300);
    let first = reaper.run_once().await.unwrap();
    assert_eq!(first.tokens_expired, 1);

    let second = reaper.run_once().await.unwrap();
    assert_eq!(second.tokens_expired, 0);
    assert_eq!(second.sessions_closed, 0);

    // Still exactly one expired audit entry
    let entries = audit_log::Entity::find()
        .filter(audit_log::Column::Action.eq("expired"))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sweep_audits_every_expired_token_exactly_once() {
    let app = TestApp::new().await;
    tokens::issue(&app.db, 42, TokenKind::Login, 0, 16, None)
        .await
        .unwrap();
    tokens::issue(&app.db, 7, TokenKind::Api, 0, 16, None)
        .await
        .unwrap();

    let reaper = reaper_with(&app, 300);
    let stats = reaper.run_once().await.unwrap();
    assert_eq!(stats.tokens_expired, 2);

    // Each flipped row committed together with its audit entry
    let entries = audit_log::Entity::find()
        .filter(audit_log::Column::Action.eq("expired"))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);

    reaper.run_once().await.unwrap();
    let entries = audit_log::Entity::find()
        .filter(audit_log::Column::Action.eq("expired"))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2, "rerun adds nothing");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sweep_closes_silent_sessions() {
    let app = TestApp::new().await;
    let secret = app.issue_token(42, "login").await;
    app.game_call(json!({"action": "verify", "token": secret, "external_identity": "guid-s"}))
        .await;

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    // Stale window of zero: any session a second old has gone silent
    let stats = reaper_with(&app, 0).run_once().await.unwrap();
    assert_eq!(stats.sessions_closed, 1);

    let row = session::Entity::find().one(&app.db).await.unwrap().unwrap();
    assert_eq!(row.status, SessionStatus::Offline.as_str());
    assert!(row.logout_time.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sweep_spares_fresh_sessions() {
    let app = TestApp::new().await;
    let secret = app.issue_token(42, "login").await;
    app.game_call(json!({"action": "verify", "token": secret, "external_identity": "guid-f"}))
        .await;

    let stats = reaper_with(&app, 300).run_once().await.unwrap();
    assert_eq!(stats.sessions_closed, 0);

    let row = session::Entity::find().one(&app.db).await.unwrap().unwrap();
    assert_eq!(row.status, SessionStatus::Active.as_str());
}
