//! Login, refresh and session payloads.

use classaccess_core::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::users::{PublicUser, User};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "El correo no es válido"))]
    pub correo: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

/// Body form of a refresh or logout request, for clients that do not use cookies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshTokenBody {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// Login response payload. Tokens appear here only under body delivery.
#[derive(Debug, Clone, Serialize)]
pub struct LoginData {
    pub user: PublicUser,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshData {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Non-sensitive profile stored in the client-readable `userData` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub id_usu: i32,
    pub nombre_usu: String,
    pub ap_usu: String,
    pub am_usu: String,
    pub correo_usu: String,
    pub priv_usu: Role,
    pub estatus_usu: bool,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id_usu: user.id_usu,
            nombre_usu: user.nombre_usu.clone(),
            ap_usu: user.ap_usu.clone(),
            am_usu: user.am_usu.clone(),
            correo_usu: user.correo_usu.clone(),
            priv_usu: user.priv_usu,
            estatus_usu: user.estatus_usu,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionIdentity {
    pub id: i32,
    pub correo: String,
    pub priv_usu: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionIdentity>,
}
