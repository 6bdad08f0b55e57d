//! Tracing setup and per-request logging.
//!
//! Three sinks: a compact console layer filtered by `RUST_LOG`, a daily
//! rolling plaintext file holding errors only, and a daily rolling JSON file
//! at info level for log shippers. File writers are non-blocking; keep the
//! returned guards alive until shutdown or buffered lines are lost.

use std::fs;
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use classaccess_config::ServerConfig;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "classaccess=info,tower_http=warn,sqlx=warn";

pub fn init_tracing(config: &ServerConfig) -> anyhow::Result<Vec<WorkerGuard>> {
    fs::create_dir_all(&config.log_dir)?;

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let (error_writer, error_guard) = tracing_appender::non_blocking(RollingFileAppender::new(
        Rotation::DAILY,
        &config.log_dir,
        "classaccess.log",
    ));
    let error_layer = fmt::layer()
        .with_writer(error_writer)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let (json_writer, json_guard) = tracing_appender::non_blocking(RollingFileAppender::new(
        Rotation::DAILY,
        &config.log_dir,
        "classaccess.json",
    ));
    let json_layer = fmt::layer()
        .json()
        .with_writer(json_writer)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(error_layer)
        .with(json_layer)
        .try_init()?;

    info!(log_dir = %config.log_dir, environment = ?config.environment, "Tracing initialized");
    Ok(vec![error_guard, json_guard])
}

/// Wraps each request in a span carrying a request id, the route and the
/// caller's address, and logs completion at a level matching the status.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        client = %client,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status().as_u16();
        let latency_ms = start.elapsed().as_millis() as u64;

        match status {
            500..=599 => error!(status, latency_ms, "Server error"),
            400..=499 => warn!(status, latency_ms, "Client error"),
            _ => info!(status, latency_ms, "Request completed"),
        }

        response
    }
    .instrument(span)
    .await
}
