use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use classaccess_core::{ApiResponse, AppError};
use classaccess_models::classrooms::{Classroom, ClassroomDto};

use super::service::ClassroomService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

pub async fn list_classrooms(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Classroom>>>, AppError> {
    let classrooms = ClassroomService::list(state.store.as_ref()).await?;
    Ok(Json(ApiResponse::ok("Aulas obtenidas", classrooms)))
}

pub async fn create_classroom(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ClassroomDto>,
) -> Result<(StatusCode, Json<ApiResponse<Classroom>>), AppError> {
    let classroom = ClassroomService::create(state.store.as_ref(), dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Aula creada correctamente", classroom)),
    ))
}

pub async fn update_classroom(
    State(state): State<AppState>,
    Path(room_id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<ClassroomDto>,
) -> Result<Json<ApiResponse<Classroom>>, AppError> {
    let classroom = ClassroomService::update(state.store.as_ref(), room_id, dto).await?;
    Ok(Json(ApiResponse::ok("Aula actualizada correctamente", classroom)))
}
