//! Classroom readers. A room points at the device installed in it.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Device {
    pub id_dispositivo: i32,
    pub nombre_dis: String,
    pub estatus_dis: bool,
}

/// New devices start active.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDeviceDto {
    #[validate(length(min = 1, max = 100, message = "Nombre del dispositivo requerido"))]
    pub nombre_dis: String,
}
