use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, ServerError};

/// A monitored endpoint.
#[derive(Debug, Clone)]
pub struct Monitor {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub enabled: bool,
}

/// One probe result.
#[derive(Debug, Clone)]
pub struct MonitorCheck {
    pub ok: bool,
    pub latency_ms: i32,
    pub status_code: Option<i32>,
    pub checked_at: DateTime<Utc>,
}

/// Rolling uptime percentages; `None` when no checks fell in the window.
#[derive(Debug, Clone)]
pub struct Uptime {
    pub day: Option<f64>,
    pub week: Option<f64>,
}

/// Create a monitor. Returns the generated UUID.
pub async fn create_monitor(pool: &PgPool, name: &str, url: &str) -> Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO monitors (name, url) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(url)
    .fetch_one(pool)
    .await
    .map_err(|e| ServerError::Database(format!("create_monitor failed: {e}")))?;

    Ok(row.0)
}

/// All monitors, enabled or not.
pub async fn list_monitors(pool: &PgPool) -> Result<Vec<Monitor>> {
    let rows: Vec<(Uuid, String, String, bool)> = sqlx::query_as(
        "SELECT id, name, url, enabled FROM monitors ORDER BY created_at",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| ServerError::Database(format!("list_monitors failed: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|(id, name, url, enabled)| Monitor {
            id,
            name,
            url,
            enabled,
        })
        .collect())
}

/// Monitors the background checker should probe.
pub async fn list_enabled_monitors(pool: &PgPool) -> Result<Vec<Monitor>> {
    let rows: Vec<(Uuid, String, String, bool)> = sqlx::query_as(
        "SELECT id, name, url, enabled FROM monitors WHERE enabled ORDER BY created_at",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| ServerError::Database(format!("list_enabled_monitors failed: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|(id, name, url, enabled)| Monitor {
            id,
            name,
            url,
            enabled,
        })
        .collect())
}

/// Append one probe result.
pub async fn insert_check(
    pool: &PgPool,
    monitor_id: Uuid,
    ok: bool,
    latency_ms: i32,
    status_code: Option<i32>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO monitor_checks (monitor_id, ok, latency_ms, status_code)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(monitor_id)
    .bind(ok)
    .bind(latency_ms)
    .bind(status_code)
    .execute(pool)
    .await
    .map_err(|e| ServerError::Database(format!("insert_check failed: {e}")))?;

    Ok(())
}

/// The most recent check for a monitor, if any.
pub async fn latest_check(pool: &PgPool, monitor_id: Uuid) -> Result<Option<MonitorCheck>> {
    let row: Option<(bool, i32, Option<i32>, DateTime<Utc>)> = sqlx::query_as(
        "SELECT ok, latency_ms, status_code, checked_at
         FROM monitor_checks WHERE monitor_id = $1
         ORDER BY checked_at DESC LIMIT 1",
    )
    .bind(monitor_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ServerError::Database(format!("latest_check failed: {e}")))?;

    Ok(row.map(|(ok, latency_ms, status_code, checked_at)| MonitorCheck {
        ok,
        latency_ms,
        status_code,
        checked_at,
    }))
}

/// Recent checks for a monitor, newest first, bounded by `limit`.
pub async fn recent_checks(
    pool: &PgPool,
    monitor_id: Uuid,
    limit: i64,
) -> Result<Vec<MonitorCheck>> {
    let rows: Vec<(bool, i32, Option<i32>, DateTime<Utc>)> = sqlx::query_as(
        "SELECT ok, latency_ms, status_code, checked_at
         FROM monitor_checks WHERE monitor_id = $1
         ORDER BY checked_at DESC LIMIT $2",
    )
    .bind(monitor_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| ServerError::Database(format!("recent_checks failed: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|(ok, latency_ms, status_code, checked_at)| MonitorCheck {
            ok,
            latency_ms,
            status_code,
            checked_at,
        })
        .collect())
}

/// Rolling 24-hour and 7-day uptime percentages for a monitor. A window
/// with no checks reports `None`, not 0%.
pub async fn uptime(pool: &PgPool, monitor_id: Uuid) -> Result<Uptime> {
    let row: (Option<f64>, Option<f64>) = sqlx::query_as(
        "SELECT
            (SELECT (COUNT(*) FILTER (WHERE ok) * 100.0 / NULLIF(COUNT(*), 0))::float8
             FROM monitor_checks
             WHERE monitor_id = $1 AND checked_at > NOW() - INTERVAL '24 hours'),
            (SELECT (COUNT(*) FILTER (WHERE ok) * 100.0 / NULLIF(COUNT(*), 0))::float8
             FROM monitor_checks
             WHERE monitor_id = $1 AND checked_at > NOW() - INTERVAL '7 days')",
    )
    .bind(monitor_id)
    .fetch_one(pool)
    .await
    .map_err(|e| ServerError::Database(format!("uptime failed: {e}")))?;

    Ok(Uptime {
        day: row.0,
        week: row.1,
    })
}
