use axum::{
    Router,
    http::{HeaderValue, header},
    middleware,
    routing::{MethodRouter, get, post},
};
use tower_governor::GovernorLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use super::controller::{login, logout, refresh, session};
use crate::middleware::auth::optional_auth;
use crate::state::AppState;

pub fn init_auth_router(state: AppState) -> Router<AppState> {
    // Login gets its own bucket on top of the one shared by all of /api.
    let login_route: MethodRouter<AppState> = match state.rate_limit_config.auth_governor_config() {
        Some(config) => post(login).layer(GovernorLayer::new(config)),
        None => post(login),
    };

    let session_router = Router::new()
        .route("/session", get(session))
        .route_layer(middleware::from_fn_with_state(state, optional_auth));

    Router::new()
        .route("/login", login_route)
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .merge(session_router)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
