use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use classaccess::logging::init_tracing;
use classaccess::metrics::init_metrics;
use classaccess::router::init_router;
use classaccess::state::AppState;
use classaccess_config::{
    CookieConfig, CorsConfig, DatabaseConfig, JwtConfig, RateLimitConfig, ServerConfig,
};
use classaccess_core::set_expose_internal_errors;
use classaccess_db::{PgStore, init_db_pool};
use dotenvy::dotenv;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let server_config = ServerConfig::from_env();
    let _log_guards = init_tracing(&server_config)?;
    set_expose_internal_errors(!server_config.is_production());

    let jwt_config = JwtConfig::from_env();
    let cookie_config = CookieConfig::from_env();
    let cors_config = CorsConfig::from_env();
    let rate_limit_config = RateLimitConfig::from_env();
    let db_config = DatabaseConfig::from_env()?;

    let pool = init_db_pool(&db_config)
        .await
        .context("Failed to connect to database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!(max_connections = db_config.max_connections, "Database ready");

    let metrics = init_metrics(server_config.metrics_enabled)?;
    let store = Arc::new(PgStore::new(pool.clone()));
    let state = AppState::new(
        store,
        &jwt_config,
        cookie_config,
        cors_config,
        rate_limit_config,
    )
    .with_metrics(metrics);
    let app = init_router(state);

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(%address, environment = ?server_config.environment, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Draining database pool");
    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
