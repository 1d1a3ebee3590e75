use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::time::Duration;

use crate::config::Config;

/// Initialize the database connection from config.
///
/// Timeouts are short and fixed: a store call that cannot acquire a
/// connection within a few seconds fails closed and is safe to retry.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut opts = ConnectOptions::new(&config.database_url);

    // In-memory SQLite gets one database per connection; keep the pool at
    // a single connection so every caller sees the same schema.
    let max_connections = if config.database_url.contains("sqlite::memory:") {
        1
    } else {
        50
    };

    opts.max_connections(max_connections)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(config.is_dev());

    SeaDatabase::connect(opts).await
}
