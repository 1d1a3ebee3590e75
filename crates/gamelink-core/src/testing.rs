use axum::http::HeaderMap;
use sea_orm::DatabaseConnection;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::auth;
use crate::config::{Config, TokenConfig};

/// Shared secrets used by every test app.
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing";
pub const TEST_GAME_API_KEY: &str = "test-game-api-key";

/// A test application builder for integration testing.
///
/// Spins up a gamelink server with an in-memory SQLite database and two
/// seeded accounts (42 "Alice", 7 "Bob").
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_issue() {
///     let app = TestApp::new().await;
///     let jwt = app.jwt_for(42);
///     let res = app.client.post_with_auth(&app.url("/api/tokens"), &jwt, r#"{"kind":"login"}"#).await;
///     assert_eq!(res.status, 200);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub db: DatabaseConnection,
    pub config: Config,
}

impl TestApp {
    /// Create a new test app with an in-memory SQLite database.
    pub async fn new() -> Self {
        Self::with_config(Self::test_config()).await
    }

    /// Default test configuration. Tweak fields before passing to
    /// [`TestApp::with_config`] for special cases (short ttls etc.).
    pub fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            environment: "test".to_string(),
            game_api_key: TEST_GAME_API_KEY.to_string(),
            accounts: "42:Alice,7:Bob".to_string(),
            tokens: TokenConfig::default(),
        }
    }

    /// Create a new test app with a custom config.
    pub async fn with_config(config: Config) -> Self {
        let app = crate::App::with_config(config.clone())
            .await
            .expect("Failed to create test app");

        let router = app.router();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TestClient::new(addr);

        TestApp {
            addr,
            client,
            db: app.db,
            config: app.config,
        }
    }

    /// Get the base URL for the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Mint a forum-style bearer token for an account.
    pub fn jwt_for(&self, account_id: i32) -> String {
        auth::mint(account_id, &self.config.jwt_secret, 1).expect("Failed to create test JWT")
    }

    /// Issue a token through the API and return the plaintext secret.
    pub async fn issue_token(&self, account_id: i32, kind: &str) -> String {
        let jwt = self.jwt_for(account_id);
        let body = serde_json::json!({ "kind": kind });
        let res = self
            .client
            .post_with_auth(&self.url("/api/tokens"), &jwt, &body.to_string())
            .await;
        assert_eq!(res.status, 200, "Issue failed: {}", res.body);
        res.data()["secret"].as_str().unwrap().to_string()
    }

    /// Call the game API with the shared key and an action payload.
    pub async fn game_call(&self, body: serde_json::Value) -> TestResponse {
        self.client
            .post_with_api_key(&self.url("/api/game"), TEST_GAME_API_KEY, &body.to_string())
            .await
    }
}

/// A simple HTTP test client with helper methods.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    /// Create a new test client pointing at the given address.
    pub fn new(addr: SocketAddr) -> Self {
        TestClient {
            inner: reqwest::Client::new(),
            base_addr: addr,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .get(url)
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with an auth token.
    pub async fn get_with_auth(&self, url: &str, token: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, url: &str, body: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with auth token and JSON body.
    pub async fn post_with_auth(&self, url: &str, token: &str, body: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with the server-to-server API key.
    pub async fn post_with_api_key(&self, url: &str, key: &str, body: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-api-key", key)
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.base_addr)
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
    pub headers: HeaderMap,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.text().await.unwrap_or_default();
        TestResponse {
            status,
            body,
            headers,
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        let json = self.json();
        json["success"].as_bool().unwrap_or(false)
    }

    /// Get the data field from the response.
    pub fn data(&self) -> serde_json::Value {
        self.json()["data"].clone()
    }

    /// Get the error field from the response.
    pub fn error(&self) -> serde_json::Value {
        self.json()["error"].clone()
    }

    /// Get the error code string, if any.
    pub fn error_code(&self) -> Option<String> {
        self.error()["code"].as_str().map(|s| s.to_string())
    }
}
