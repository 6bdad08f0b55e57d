//! User domain models and DTOs.

use classaccess_core::Role;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A stored account, password hash included. Never serialized directly;
/// responses go through [`PublicUser`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id_usu: i32,
    pub nombre_usu: String,
    pub ap_usu: String,
    pub am_usu: String,
    pub correo_usu: String,
    pub password: String,
    #[sqlx(try_from = "i32")]
    pub priv_usu: Role,
    pub estatus_usu: bool,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.estatus_usu
    }
}

/// A user with the password hash stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id_usu: i32,
    pub nombre_usu: String,
    pub ap_usu: String,
    pub am_usu: String,
    pub correo_usu: String,
    pub priv_usu: Role,
    pub estatus_usu: bool,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id_usu: user.id_usu,
            nombre_usu: user.nombre_usu,
            ap_usu: user.ap_usu,
            am_usu: user.am_usu,
            correo_usu: user.correo_usu,
            priv_usu: user.priv_usu,
            estatus_usu: user.estatus_usu,
        }
    }
}

/// Fields needed to insert an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nombre_usu: String,
    pub ap_usu: String,
    pub am_usu: String,
    pub correo_usu: String,
    pub password_hash: String,
    pub priv_usu: Role,
    pub estatus_usu: bool,
}

/// Role-specific profile written together with a Student account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentProfile {
    pub matricula: Option<String>,
    pub cod_rfid: Option<String>,
    pub grupo: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterStudentDto {
    #[validate(length(min = 1, message = "El nombre es obligatorio"))]
    pub nombre: String,
    #[validate(length(min = 1, message = "El apellido paterno es obligatorio"))]
    pub ap: String,
    #[serde(default)]
    pub am: String,
    #[validate(email(message = "El correo no es válido"))]
    pub correo: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
    #[validate(length(min = 1, max = 50, message = "La matrícula no es válida"))]
    pub matricula: Option<String>,
    #[validate(length(min = 1, max = 100, message = "El código RFID no es válido"))]
    pub cod_rfid: Option<String>,
    pub grupo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub id_usu: i32,
    pub correo: String,
    pub priv_usu: Role,
}

/// Users grouped by role, as returned to administrators.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupedUsers {
    pub alumnos: Vec<PublicUser>,
    pub maestros: Vec<PublicUser>,
    pub administradores: Vec<PublicUser>,
}

impl FromIterator<User> for GroupedUsers {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        let mut grouped = GroupedUsers::default();
        for user in iter {
            let bucket = match user.priv_usu {
                Role::Student => &mut grouped.alumnos,
                Role::Teacher => &mut grouped.maestros,
                Role::Admin => &mut grouped.administradores,
            };
            bucket.push(user.into());
        }
        grouped
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusDto {
    pub estatus: bool,
}

/// Account columns a profile update may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub nombre_usu: String,
    pub ap_usu: String,
    pub am_usu: String,
    pub correo_usu: String,
}

/// A student account joined with its profile row. Accounts created outside
/// self-registration may have no profile yet, so the profile columns are
/// all optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct StudentDetails {
    pub id_usu: i32,
    pub nombre_usu: String,
    pub ap_usu: String,
    pub am_usu: String,
    pub correo_usu: String,
    #[sqlx(try_from = "i32")]
    pub priv_usu: Role,
    pub estatus_usu: bool,
    pub matricula: Option<String>,
    pub cod_rfid: Option<String>,
    pub grupo: Option<String>,
}

/// Full replacement of a student's account fields and profile.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100, message = "El nombre es obligatorio"))]
    pub nombre_usu: String,
    #[validate(length(min = 1, max = 100, message = "El apellido paterno es obligatorio"))]
    pub ap_usu: String,
    #[serde(default)]
    pub am_usu: String,
    #[validate(email(message = "El correo no es válido"))]
    pub correo_usu: String,
    #[validate(length(min = 1, max = 50, message = "La matrícula no es válida"))]
    pub matricula: Option<String>,
    #[validate(length(min = 1, max = 100, message = "El código RFID no es válido"))]
    pub cod_rfid: Option<String>,
    pub grupo: Option<String>,
}

impl UpdateStudentDto {
    pub fn into_parts(self) -> (UserFields, StudentProfile) {
        (
            UserFields {
                nombre_usu: self.nombre_usu,
                ap_usu: self.ap_usu,
                am_usu: self.am_usu,
                correo_usu: self.correo_usu,
            },
            StudentProfile {
                matricula: self.matricula,
                cod_rfid: self.cod_rfid,
                grupo: self.grupo,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, role: Role) -> User {
        User {
            id_usu: id,
            nombre_usu: "Ana".into(),
            ap_usu: "López".into(),
            am_usu: String::new(),
            correo_usu: format!("user{id}@escuela.mx"),
            password: "$2b$04$hash".into(),
            priv_usu: role,
            estatus_usu: true,
        }
    }

    #[test]
    fn public_user_drops_password() {
        let json = serde_json::to_value(PublicUser::from(user(1, Role::Student))).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["priv_usu"], 1);
    }

    #[test]
    fn groups_by_role() {
        let grouped: GroupedUsers = vec![
            user(1, Role::Student),
            user(2, Role::Teacher),
            user(3, Role::Student),
            user(4, Role::Admin),
        ]
        .into_iter()
        .collect();

        assert_eq!(grouped.alumnos.len(), 2);
        assert_eq!(grouped.maestros.len(), 1);
        assert_eq!(grouped.administradores.len(), 1);
    }

    #[test]
    fn registration_rejects_short_password_and_bad_email() {
        let dto = RegisterStudentDto {
            nombre: "Luis".into(),
            ap: "Pérez".into(),
            am: String::new(),
            correo: "not-an-email".into(),
            password: "123".into(),
            matricula: Some("S200".into()),
            cod_rfid: None,
            grupo: None,
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("correo"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn student_update_splits_into_account_and_profile() {
        let dto: UpdateStudentDto = serde_json::from_value(serde_json::json!({
            "nombre_usu": "Luis",
            "ap_usu": "Pérez",
            "correo_usu": "luis@escuela.mx",
            "matricula": "S300",
            "grupo": "4B"
        }))
        .unwrap();
        assert!(dto.validate().is_ok());

        let (fields, profile) = dto.into_parts();
        assert_eq!(fields.am_usu, "");
        assert_eq!(fields.correo_usu, "luis@escuela.mx");
        assert_eq!(profile.matricula.as_deref(), Some("S300"));
        assert_eq!(profile.cod_rfid, None);
    }

    #[test]
    fn student_update_rejects_empty_codes() {
        let dto = UpdateStudentDto {
            nombre_usu: "Luis".into(),
            ap_usu: "Pérez".into(),
            am_usu: String::new(),
            correo_usu: "luis@escuela.mx".into(),
            matricula: Some(String::new()),
            cod_rfid: None,
            grupo: None,
        };
        assert!(dto.validate().unwrap_err().field_errors().contains_key("matricula"));
    }
}
