use axum::{Router, routing::get};

use super::controller::register;
use crate::state::AppState;

/// `/register` is called by classroom devices and carries no session.
pub fn init_attendance_router() -> Router<AppState> {
    Router::new().route("/register", get(register))
}
