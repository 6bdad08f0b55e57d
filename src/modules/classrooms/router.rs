use axum::{
    Router, middleware,
    routing::{get, put},
};

use super::controller::{create_classroom, list_classrooms, update_classroom};
use crate::middleware::auth::require_auth;
use crate::middleware::role::require_admin;
use crate::state::AppState;

pub fn init_classrooms_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_classrooms).post(create_classroom))
        .route("/{id}", put(update_classroom))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
