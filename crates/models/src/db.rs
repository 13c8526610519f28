use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

pub use configs::DatabaseConfig;

/// Open a pool sized and timed from configuration.
///
/// An in-memory SQLite database exists per connection, so its pool is pinned
/// to exactly one connection.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let in_memory = cfg.url.contains(":memory:") || cfg.url.contains("mode=memory");
    let (max, min) = if in_memory { (1, 1) } else { (cfg.max_connections, cfg.min_connections) };

    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(max)
        .min_connections(min)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    if !in_memory {
        opts.idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs));
    }

    let db = Database::connect(opts).await?;
    info!(max_connections = max, min_connections = min, sqlite = cfg.is_sqlite(), "database pool ready");
    Ok(db)
}

/// Configuration for a throwaway in-memory SQLite database.
pub fn in_memory_config() -> DatabaseConfig {
    DatabaseConfig { url: "sqlite::memory:".into(), max_connections: 1, min_connections: 1, ..DatabaseConfig::default() }
}
