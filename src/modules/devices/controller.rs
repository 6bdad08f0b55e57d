use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use classaccess_core::{ApiResponse, AppError};
use classaccess_models::devices::{CreateDeviceDto, Device};
use classaccess_models::users::UpdateStatusDto;

use super::service::DeviceService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

pub async fn list_devices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Device>>>, AppError> {
    let devices = DeviceService::list(state.store.as_ref()).await?;
    Ok(Json(ApiResponse::ok("Dispositivos obtenidos", devices)))
}

pub async fn create_device(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateDeviceDto>,
) -> Result<(StatusCode, Json<ApiResponse<Device>>), AppError> {
    let device = DeviceService::create(state.store.as_ref(), &dto.nombre_dis).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Dispositivo registrado correctamente", device)),
    ))
}

pub async fn update_device_status(
    State(state): State<AppState>,
    Path(device_id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateStatusDto>,
) -> Result<Json<ApiResponse<Device>>, AppError> {
    let device = DeviceService::set_status(state.store.as_ref(), device_id, dto.estatus).await?;
    Ok(Json(ApiResponse::ok("Estatus actualizado", device)))
}
