use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use classaccess_core::{ApiResponse, AppError};
use classaccess_models::users::{
    GroupedUsers, PublicUser, RegisterStudentDto, RegisteredUser, UpdateStatusDto,
};
use tracing::instrument;

use super::service::UserService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[instrument(skip_all)]
pub async fn register_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterStudentDto>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredUser>>), AppError> {
    let user = UserService::register_student(state.store.as_ref(), dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Usuario registrado correctamente", user)),
    ))
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GroupedUsers>>, AppError> {
    let users = UserService::list_grouped(state.store.as_ref()).await?;
    Ok(Json(ApiResponse::ok("Usuarios obtenidos", users)))
}

#[instrument(skip(state, actor, dto))]
pub async fn update_status(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(user_id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateStatusDto>,
) -> Result<Json<ApiResponse<PublicUser>>, AppError> {
    let user = UserService::set_status(state.store.as_ref(), &actor, user_id, dto.estatus).await?;
    Ok(Json(ApiResponse::ok("Estatus actualizado", user)))
}
