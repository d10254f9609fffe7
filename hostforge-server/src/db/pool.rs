use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::{Result, ServerError};

/// Create a PostgreSQL connection pool with sensible defaults.
///
/// - max_connections: 10
/// - connect_timeout: 5 seconds
pub async fn create_pool(url: &str) -> Result<PgPool> {
    let pool: PgPool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await
        .map_err(|e| ServerError::Database(format!("failed to connect to database: {e}")))?;

    tracing::info!("database connection pool created");
    Ok(pool)
}

/// Run the initial schema migration (idempotent, uses IF NOT EXISTS).
///
/// Each statement must be executed separately because PostgreSQL's prepared
/// statements do not support multiple commands.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS monitors (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            enabled BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| ServerError::Database(format!("migration (monitors) failed: {e}")))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS monitor_checks (
            id BIGSERIAL PRIMARY KEY,
            monitor_id UUID NOT NULL REFERENCES monitors(id) ON DELETE CASCADE,
            ok BOOLEAN NOT NULL,
            latency_ms INT NOT NULL,
            status_code INT,
            checked_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| ServerError::Database(format!("migration (monitor_checks) failed: {e}")))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_monitor_checks_monitor_time
            ON monitor_checks (monitor_id, checked_at DESC)",
    )
    .execute(pool)
    .await
    .map_err(|e| ServerError::Database(format!("migration (check index) failed: {e}")))?;

    tracing::info!("database migrations applied");
    Ok(())
}
