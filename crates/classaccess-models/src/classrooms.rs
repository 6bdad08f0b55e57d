use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Classroom {
    pub id_aula: i32,
    pub nombre_aula: String,
    pub edificio: String,
    pub id_dispositivo: Option<i32>,
}

/// Body of both classroom create and update. `id_dispositivo`, when set,
/// must name an existing device.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClassroomDto {
    #[validate(length(min = 1, max = 100, message = "El nombre del aula es obligatorio"))]
    pub nombre_aula: String,
    #[validate(length(min = 1, max = 100, message = "El edificio es obligatorio"))]
    pub edificio: String,
    pub id_dispositivo: Option<i32>,
}
