use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Local;
use classaccess_core::errors::GENERIC_SERVER_ERROR;
use classaccess_core::{ApiResponse, AppError};
use classaccess_models::attendance::{RegisterQuery, StudentAttendanceEntry};
use tracing::{error, warn};

use super::service::AttendanceService;
use crate::metrics::track_attendance;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const MISSING_PARAMS: &str = "Faltan parámetros: id y aula son obligatorios";
const INVALID_ROOM: &str = "El parámetro aula no es válido";

fn plain(status: StatusCode, body: &'static str) -> Response {
    (status, body).into_response()
}

/// Device endpoint. Always answers in plaintext, failures included.
pub async fn register(
    State(state): State<AppState>,
    query: Result<Query<RegisterQuery>, QueryRejection>,
) -> Response {
    let Ok(Query(query)) = query else {
        return plain(StatusCode::BAD_REQUEST, MISSING_PARAMS);
    };

    let code = query.id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    let room = query.aula.as_deref().map(str::trim).filter(|aula| !aula.is_empty());
    let (Some(code), Some(room)) = (code, room) else {
        return plain(StatusCode::BAD_REQUEST, MISSING_PARAMS);
    };

    let Ok(room_id) = room.parse::<i32>() else {
        warn!(aula = room, "Non-numeric room in attendance request");
        return plain(StatusCode::BAD_REQUEST, INVALID_ROOM);
    };

    let now = Local::now().naive_local();
    match AttendanceService::register(state.store.as_ref(), code, room_id, now).await {
        Ok(outcome) => {
            track_attendance(outcome);
            outcome.as_str().into_response()
        }
        Err(err) => {
            error!(error = %err.error, room_id, "Attendance registration failed");
            plain(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_SERVER_ERROR)
        }
    }
}

pub async fn student_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(student_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<StudentAttendanceEntry>>>, AppError> {
    let entries =
        AttendanceService::student_history(state.store.as_ref(), &user, student_id).await?;
    Ok(Json(ApiResponse::ok("Historial de asistencia", entries)))
}
