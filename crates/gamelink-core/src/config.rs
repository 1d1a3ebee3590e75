use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://gamelink.db, postgres://...)
    pub database_url: String,

    /// Secret shared with the forum for validating its HS256 bearer tokens.
    /// This service only validates; the forum mints.
    pub jwt_secret: String,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 3000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// Pre-shared key the game server must present on every /api/game call.
    /// An empty key rejects all game-server traffic (fail closed).
    pub game_api_key: String,

    /// Demo account seed for the static directory, as "id:name,id:name".
    /// A real deployment implements `AccountDirectory` against the forum store.
    pub accounts: String,

    /// Token and session lifecycle knobs.
    pub tokens: TokenConfig,
}

/// Lifecycle knobs for tokens, sessions and the reaper.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// One-time login token time-to-live in seconds (default: 600)
    pub login_ttl_secs: u64,

    /// API token time-to-live in seconds (default: 30 days)
    pub api_ttl_secs: u64,

    /// Heartbeat silence window before a session is marked offline (default: 300)
    pub session_stale_secs: u64,

    /// Length of generated token secrets in bytes; hex doubles it (default: 16)
    pub token_length_bytes: usize,

    /// Interval between reaper sweeps in seconds (default: 60)
    pub reaper_interval_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        TokenConfig {
            login_ttl_secs: 600,
            api_ttl_secs: 2_592_000,
            session_stale_secs: 300,
            token_length_bytes: 16,
            reaper_interval_secs: 60,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://gamelink.db?mode=rwc".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "gamelink-dev-secret-change-me".to_string()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env_parse("SERVER_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            game_api_key: std::env::var("GAME_API_KEY").unwrap_or_default(),
            accounts: std::env::var("ACCOUNTS").unwrap_or_default(),
            tokens: TokenConfig {
                login_ttl_secs: env_parse("LOGIN_TOKEN_TTL_SECS", 600),
                api_ttl_secs: env_parse("API_TOKEN_TTL_SECS", 2_592_000),
                session_stale_secs: env_parse("SESSION_STALE_SECS", 300),
                token_length_bytes: env_parse("TOKEN_LENGTH_BYTES", 16),
                reaper_interval_secs: env_parse("REAPER_INTERVAL_SECS", 60),
            },
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
