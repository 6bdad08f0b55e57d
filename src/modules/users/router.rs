use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::controller::{list_users, register_student, update_status};
use crate::middleware::auth::require_auth;
use crate::middleware::role::require_admin;
use crate::state::AppState;

pub fn init_users_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(list_users))
        .route("/{id}/status", put(update_status))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/register", post(register_student))
        .merge(admin)
}
