//! PostgreSQL pool setup and schema bootstrap for the moderation store.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;

pub use config::DatabaseConfig;

const SCHEMA: &str = include_str!("../../migrations/0001_moderation.sql");

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a pool sized and timed by `config`.
    ///
    /// ```no_run
    /// use poker_deal::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env().unwrap_or_default();
    ///     let db = Database::new(&config).await?;
    ///     db.migrate().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let secs = Duration::from_secs;
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(secs(config.connection_timeout_secs))
            .idle_timeout(secs(config.idle_timeout_secs))
            .max_lifetime(secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        log::info!(
            "PostgreSQL pool ready ({}..={} connections)",
            config.min_connections,
            config.max_connections
        );
        Ok(Self { pool })
    }

    /// Idempotent: every statement in the schema is `IF NOT EXISTS`.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Waits for checked-out connections to return before closing.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
    async fn test_migrate_twice_against_live_database() {
        let config = DatabaseConfig::from_env().expect("DATABASE_URL must be set");
        let db = Database::new(&config).await.expect("connect");

        db.migrate().await.expect("first migration");
        db.migrate().await.expect("second migration");
        db.health_check().await.expect("health check");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM moderation_bans")
            .fetch_one(db.pool())
            .await
            .expect("bans table exists");
        assert!(count >= 0);
        db.close().await;
    }
}
