// End-to-end token lifecycle tests: issue, verify, replay, expiry.

use gamelink_core::auth::tokens;
use gamelink_core::models::token::{self, TokenKind, TokenStatus};
use gamelink_core::testing::TestApp;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;

async fn active_token_count(app: &TestApp, account_id: i32, kind: &str) -> usize {
    token::Entity::find()
        .filter(token::Column::AccountId.eq(account_id))
        .filter(token::Column::Kind.eq(kind))
        .filter(token::Column::Status.eq(TokenStatus::Active.as_str()))
        .all(&app.db)
        .await
        .unwrap()
        .len()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_issue_then_verify_round_trip() {
    let app = TestApp::new().await;
    let secret = app.issue_token(42, "login").await;
    assert_eq!(secret.len(), 32, "default secret is 16 bytes / 32 hex chars");

    let res = app
        .game_call(json!({
            "action": "verify",
            "token": secret,
            "external_identity": "guid-123",
            "origin_address": "10.0.0.5",
            "origin_port": 12203,
        }))
        .await;

    assert_eq!(res.status, 200);
    assert!(res.is_success(), "verify failed: {}", res.body);
    assert_eq!(res.data()["account_id"], 42);
    assert_eq!(res.data()["display_name"], "Alice");
    assert_eq!(res.data()["external_identity"], "guid-123");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_token_is_single_use() {
    let app = TestApp::new().await;
    let secret = app.issue_token(42, "login").await;

    let first = app
        .game_call(json!({"action": "verify", "token": secret, "external_identity": "guid-1"}))
        .await;
    assert!(first.is_success());

    // Replay: same transport-level success, business error in the envelope,
    // indistinguishable from a plain miss.
    let second = app
        .game_call(json!({"action": "verify", "token": secret, "external_identity": "guid-1"}))
        .await;
    assert_eq!(second.status, 200);
    assert!(!second.is_success());
    assert_eq!(
        second.error_code().as_deref(),
        Some("INVALID_OR_EXPIRED_TOKEN")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_token_is_multi_use() {
    let app = TestApp::new().await;
    let secret = app.issue_token(7, "api").await;

    for _ in 0..2 {
        let res = app
            .game_call(json!({"action": "verify", "token": secret}))
            .await;
        assert!(res.is_success(), "API token verify failed: {}", res.body);
        assert_eq!(res.data()["account_id"], 7);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_token_not_found_lazily() {
    let app = TestApp::new().await;

    // ttl 0 expires immediately; no sweep has run, lookup still misses it
    let issued = tokens::issue(&app.db, 42, TokenKind::Login, 0, 16, None)
        .await
        .unwrap();

    let res = app
        .game_call(json!({"action": "verify", "token": issued.secret}))
        .await;
    assert!(!res.is_success());
    assert_eq!(
        res.error_code().as_deref(),
        Some("INVALID_OR_EXPIRED_TOKEN")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_secret_rejected() {
    let app = TestApp::new().await;
    let res = app
        .game_call(json!({"action": "verify", "token": "0123456789abcdef0123456789abcdef"}))
        .await;
    assert!(!res.is_success());
    assert_eq!(
        res.error_code().as_deref(),
        Some("INVALID_OR_EXPIRED_TOKEN")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_new_issue_displaces_prior_active() {
    let app = TestApp::new().await;

    let old_secret = app.issue_token(42, "login").await;
    let new_secret = app.issue_token(42, "login").await;
    assert_ne!(old_secret, new_secret);

    assert_eq!(active_token_count(&app, 42, "login").await, 1);

    // Both rows persist; the displaced one is terminal
    let all = token::Entity::find()
        .filter(token::Column::AccountId.eq(42))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all
        .iter()
        .any(|t| t.status == TokenStatus::Revoked.as_str()));

    // The displaced secret no longer verifies
    let res = app
        .game_call(json!({"action": "verify", "token": old_secret}))
        .await;
    assert!(!res.is_success());

    let res = app
        .game_call(json!({"action": "verify", "token": new_secret}))
        .await;
    assert!(res.is_success());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_issues_leave_one_active() {
    let app = TestApp::new().await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let db = app.db.clone();
        handles.push(tokio::spawn(async move {
            tokens::issue(&db, 42, TokenKind::Login, 600, 16, None).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(active_token_count(&app, 42, "login").await, 1);

    let all = token::Entity::find()
        .filter(token::Column::AccountId.eq(42))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(all.len(), 8, "every issuance is persisted");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_schema_rejects_second_active_row() {
    use gamelink_core::auth::{hash_secret, secret_prefix};
    use sea_orm::{ActiveModelTrait, Set};

    let app = TestApp::new().await;
    app.issue_token(42, "login").await;

    // Bypass the issuance transaction and insert a competing active row
    // directly; the partial unique index must reject it.
    let now = chrono::Utc::now().naive_utc();
    let competing = token::ActiveModel {
        account_id: Set(42),
        secret_hash: Set(hash_secret("ffffffffffffffffffffffffffffffff")),
        secret_prefix: Set(secret_prefix("ffffffffffffffffffffffffffffffff")),
        kind: Set(TokenKind::Login.as_str().to_string()),
        created_at: Set(now),
        expires_at: Set(now + chrono::Duration::seconds(600)),
        used_at: Set(None),
        used_from: Set(None),
        external_identity: Set(None),
        status: Set(TokenStatus::Active.as_str().to_string()),
        ..Default::default()
    };
    let result = competing.insert(&app.db).await;
    assert!(
        result.is_err(),
        "a second active row per (account, kind) must violate the unique index"
    );
    assert_eq!(active_token_count(&app, 42, "login").await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_consume_rolls_back_with_failed_transaction() {
    use sea_orm::TransactionTrait;

    let app = TestApp::new().await;
    let secret = app.issue_token(42, "login").await;
    let row = tokens::lookup_active(&app.db, &secret)
        .await
        .unwrap()
        .unwrap();

    // Consume inside a transaction that never commits: the flip must not
    // survive, so a retry with the same secret still succeeds.
    let txn = app.db.begin().await.unwrap();
    tokens::consume(&txn, row.id, None, None).await.unwrap();
    txn.rollback().await.unwrap();

    let res = app
        .game_call(json!({"action": "verify", "token": secret}))
        .await;
    assert!(res.is_success(), "rolled-back consume burned the token");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_verifies_one_winner() {
    let app = TestApp::new().await;
    let secret = app.issue_token(42, "login").await;

    let mut handles = Vec::new();
    for _ in 0..6 {
        let client = app.client.clone();
        let url = app.url("/api/game");
        let secret = secret.clone();
        handles.push(tokio::spawn(async move {
            let body = json!({"action": "verify", "token": secret, "external_identity": "guid-r"});
            client
                .post_with_api_key(&url, gamelink_core::testing::TEST_GAME_API_KEY, &body.to_string())
                .await
        }));
    }

    let mut successes = 0;
    let mut failures = 0;
    for handle in handles {
        let res = handle.await.unwrap();
        assert_eq!(res.status, 200);
        if res.is_success() {
            successes += 1;
        } else {
            assert_eq!(
                res.error_code().as_deref(),
                Some("INVALID_OR_EXPIRED_TOKEN")
            );
            failures += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one verify wins the race");
    assert_eq!(failures, 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_verify_without_identity_is_degenerate_success() {
    let app = TestApp::new().await;
    let secret = app.issue_token(42, "login").await;

    let res = app
        .game_call(json!({"action": "verify", "token": secret}))
        .await;
    assert!(res.is_success());
    assert_eq!(res.data()["account_id"], 42);
    assert!(res.data()["external_identity"].is_null());

    // Token consumed, but no link and no session
    use gamelink_core::models::{identity, session};
    let links = identity::Entity::find().all(&app.db).await.unwrap();
    assert!(links.is_empty());
    let sessions = session::Entity::find().all(&app.db).await.unwrap();
    assert!(sessions.is_empty());

    // Audit still records the use
    let jwt = app.jwt_for(42);
    let history = app
        .client
        .get_with_auth(&app.url("/api/tokens/history"), &jwt)
        .await;
    let entries = history.data();
    let actions: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"used"));
}
