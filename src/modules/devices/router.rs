use axum::{
    Router, middleware,
    routing::{get, put},
};

use super::controller::{create_device, list_devices, update_device_status};
use crate::middleware::auth::require_auth;
use crate::middleware::role::require_admin;
use crate::state::AppState;

pub fn init_devices_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_devices).post(create_device))
        .route("/{id}/status", put(update_device_status))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
