use axum::{Router, middleware, routing::get};

use super::controller::{get_student, update_student};
use crate::middleware::auth::require_auth;
use crate::modules::attendance::controller::student_history;
use crate::state::AppState;

/// Students reach their own id; staff reach any.
pub fn init_students_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_student).put(update_student))
        .route("/{id}/attendance", get(student_history))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
