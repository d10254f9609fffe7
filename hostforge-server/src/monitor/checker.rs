//! Background uptime checker.
//!
//! Probes every enabled monitor on a fixed interval and appends one check
//! row per probe. Probe and database errors are logged and skipped; the
//! task itself never exits.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::db::monitors;
use crate::state::AppState;

/// Per-probe timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one probe.
struct ProbeResult {
    ok: bool,
    latency_ms: i32,
    status_code: Option<i32>,
}

async fn probe(http: &reqwest::Client, url: &str) -> ProbeResult {
    let started = Instant::now();
    let outcome = tokio::time::timeout(PROBE_TIMEOUT, http.get(url).send()).await;
    let latency_ms = started.elapsed().as_millis().min(i32::MAX as u128) as i32;

    match outcome {
        Ok(Ok(response)) => {
            let status = response.status();
            ProbeResult {
                ok: status.is_success(),
                latency_ms,
                status_code: Some(status.as_u16() as i32),
            }
        }
        Ok(Err(_)) | Err(_) => ProbeResult {
            ok: false,
            latency_ms,
            status_code: None,
        },
    }
}

/// One round: probe every enabled monitor and record the results.
pub async fn run_once(state: &Arc<AppState>) {
    let Some(pool) = &state.pool else {
        return;
    };

    let monitors = match monitors::list_enabled_monitors(pool).await {
        Ok(monitors) => monitors,
        Err(e) => {
            tracing::warn!(error = %e, "status checker could not list monitors");
            return;
        }
    };

    for monitor in monitors {
        let result = probe(&state.http, &monitor.url).await;
        tracing::debug!(
            monitor = %monitor.name,
            ok = result.ok,
            latency_ms = result.latency_ms,
            "monitor probed"
        );
        if let Err(e) = monitors::insert_check(
            pool,
            monitor.id,
            result.ok,
            result.latency_ms,
            result.status_code,
        )
        .await
        {
            tracing::warn!(monitor = %monitor.name, error = %e, "failed to record check");
        }
    }
}

/// Run the checker forever. Also sweeps the in-memory stores each round so
/// expired sessions and rate windows do not pile up.
pub async fn run(state: Arc<AppState>) {
    let interval = Duration::from_secs(state.config.status_check_interval_secs.max(5));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tracing::info!(interval_secs = interval.as_secs(), "status checker started");
    loop {
        ticker.tick().await;
        run_once(&state).await;

        state.sessions.cleanup_expired();
        state.checkouts.cleanup_expired();
        state
            .limiter
            .cleanup_expired(&hostforge_core::traits::SystemClock);
    }
}
