use axum::{
    Json,
    extract::{Path, State},
};
use classaccess_core::{ApiResponse, AppError};
use classaccess_models::users::{StudentDetails, UpdateStudentDto};
use tracing::instrument;

use super::service::StudentService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[instrument(skip(state, user))]
pub async fn get_student(
    State(state): State<AppState>,
    user: AuthUser,
    Path(student_id): Path<i32>,
) -> Result<Json<ApiResponse<StudentDetails>>, AppError> {
    let student = StudentService::get(state.store.as_ref(), &user, student_id).await?;
    Ok(Json(ApiResponse::ok("Alumno obtenido", student)))
}

#[instrument(skip(state, user, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    user: AuthUser,
    Path(student_id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<ApiResponse<StudentDetails>>, AppError> {
    let student = StudentService::update(state.store.as_ref(), &user, student_id, dto).await?;
    Ok(Json(ApiResponse::ok("Alumno actualizado correctamente", student)))
}
