use axum::http::{HeaderValue, Method, header};
use axum::{Json, Router, middleware, routing::get};
use chrono::Utc;
use classaccess_config::CorsConfig;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;

use crate::logging::logging_middleware;
use crate::metrics::{metrics_handler, metrics_middleware};
use crate::modules::attendance::router::init_attendance_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::classrooms::router::init_classrooms_router;
use crate::modules::devices::router::init_devices_router;
use crate::modules::students::router::init_students_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let mut api = Router::new()
        .nest("/auth", init_auth_router(state.clone()))
        .nest("/attendance", init_attendance_router())
        .nest("/students", init_students_router(state.clone()))
        .nest("/users", init_users_router(state.clone()))
        .nest("/classrooms", init_classrooms_router(state.clone()))
        .nest("/devices", init_devices_router(state.clone()));

    if let Some(config) = state.rate_limit_config.general_governor_config() {
        api = api.layer(GovernorLayer::new(config));
    }

    let cors = cors_layer(&state.cors_config);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(logging_middleware))
                .layer(middleware::from_fn(metrics_middleware))
                .layer(cors),
        )
}
