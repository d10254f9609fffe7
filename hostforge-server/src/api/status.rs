use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::ok;
use crate::db::monitors;
use crate::error::{Result, ServerError};
use crate::session::require_admin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMonitorRequest {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// The status subsystem needs Postgres; without `DATABASE_URL` its routes
/// answer 503.
fn require_pool(state: &Arc<AppState>) -> Result<&PgPool> {
    state
        .pool
        .as_ref()
        .ok_or_else(|| ServerError::Unavailable("status monitoring is not configured".to_string()))
}

fn check_json(check: &monitors::MonitorCheck) -> Value {
    json!({
        "ok": check.ok,
        "latency_ms": check.latency_ms,
        "status_code": check.status_code,
        "checked_at": check.checked_at,
    })
}

/// GET /api/status/monitors
///
/// Public status page data: every monitor with its latest check and
/// rolling uptime percentages.
pub async fn list_monitors(State(state): State<Arc<AppState>>) -> Result<Response> {
    let pool = require_pool(&state)?;

    let all = monitors::list_monitors(pool).await?;
    let mut out = Vec::with_capacity(all.len());
    for monitor in all {
        let latest = monitors::latest_check(pool, monitor.id).await?;
        let uptime = monitors::uptime(pool, monitor.id).await?;
        out.push(json!({
            "id": monitor.id,
            "name": monitor.name,
            "enabled": monitor.enabled,
            "latest": latest.as_ref().map(check_json),
            "uptime_24h": uptime.day,
            "uptime_7d": uptime.week,
        }));
    }

    Ok(ok(json!({ "monitors": out })).into_response())
}

/// GET /api/status/monitors/{id}/history?limit=N
///
/// Recent checks for one monitor, newest first, bounded.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response> {
    let pool = require_pool(&state)?;
    let limit = query.limit.unwrap_or(100).clamp(1, 1_000);

    let checks = monitors::recent_checks(pool, id, limit).await?;
    let history: Vec<Value> = checks.iter().map(check_json).collect();

    Ok(ok(json!({ "monitor_id": id, "checks": history })).into_response())
}

/// POST /api/status/monitors
///
/// Admin-only: register an endpoint for the background checker.
pub async fn create_monitor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateMonitorRequest>,
) -> Result<Response> {
    let admin = require_admin(&state, &headers)?;
    let pool = require_pool(&state)?;

    let name = req.name.trim();
    if name.is_empty() || name.len() > 100 {
        return Err(ServerError::BadRequest(
            "monitor name must be 1 to 100 characters".to_string(),
        ));
    }
    if !req.url.starts_with("http://") && !req.url.starts_with("https://") {
        return Err(ServerError::BadRequest(
            "monitor url must be http(s)".to_string(),
        ));
    }

    let id = monitors::create_monitor(pool, name, &req.url).await?;
    tracing::info!(monitor = %id, admin = %admin.client_id, "monitor created");

    Ok(ok(json!({ "id": id })).into_response())
}
