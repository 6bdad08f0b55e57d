//! Prometheus metrics.
//!
//! The recorder is installed once at startup when `METRICS_ENABLED` is set.
//! Every helper here is a no-op until then, so tests and the CLI never pay
//! for it.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use classaccess_core::Role;
use classaccess_models::attendance::AttendanceOutcome;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

static METRICS_ENABLED: OnceLock<bool> = OnceLock::new();

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

pub fn is_metrics_enabled() -> bool {
    METRICS_ENABLED.get().copied().unwrap_or(false)
}

/// Installs the Prometheus recorder and spawns its upkeep task.
/// Returns `None` when metrics are disabled.
pub fn init_metrics(enabled: bool) -> anyhow::Result<Option<PrometheusHandle>> {
    let _ = METRICS_ENABLED.set(enabled);
    if !enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_metrics_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);
    gauge!("http_requests_active").decrement(1.0);

    response
}

/// `GET /metrics` in Prometheus text format. 404 when metrics are disabled.
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn track_login_success(role: Role) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("user_logins_total", "role" => role.as_str(), "status" => "success").increment(1);
}

pub fn track_login_failure(reason: &'static str) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("user_logins_total", "role" => "unknown", "status" => "failure", "reason" => reason)
        .increment(1);
}

pub fn track_user_created(role: Role) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("users_created_total", "role" => role.as_str()).increment(1);
}

/// One count per device scan, labelled with the plaintext outcome.
pub fn track_attendance(outcome: AttendanceOutcome) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("attendance_events_total", "outcome" => outcome.as_str()).increment(1);
}
