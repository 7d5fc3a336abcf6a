use std::str::FromStr;

use anyhow::Context;
use rota_config::DatabaseConfig;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

/// Open the connection pool described by `config`
///
/// In-memory databases exist per connection, so they are pinned to a single
/// connection that never idles out.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the database cannot be opened
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("invalid database url `{}`", config.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database `{}`", config.url))?;

    tracing::debug!(url = %config.url, "database pool ready");

    Ok(pool)
}
