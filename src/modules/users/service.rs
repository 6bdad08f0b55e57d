use classaccess_core::{AppError, Role, hash_password};
use classaccess_db::Store;
use classaccess_models::users::{
    GroupedUsers, NewUser, PublicUser, RegisterStudentDto, RegisteredUser, StudentProfile,
};
use tracing::{info, instrument};

use crate::metrics::track_user_created;
use crate::middleware::auth::AuthUser;

pub struct UserService;

impl UserService {
    /// Self-registration. Always creates an active Student; the account row
    /// and the student profile are written together or not at all.
    #[instrument(skip(store, dto), fields(correo = %dto.correo))]
    pub async fn register_student(
        store: &dyn Store,
        dto: RegisterStudentDto,
    ) -> Result<RegisteredUser, AppError> {
        let password = dto.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let new_user = NewUser {
            nombre_usu: dto.nombre,
            ap_usu: dto.ap,
            am_usu: dto.am,
            correo_usu: dto.correo,
            password_hash,
            priv_usu: Role::Student,
            estatus_usu: true,
        };
        let profile = StudentProfile {
            matricula: dto.matricula,
            cod_rfid: dto.cod_rfid,
            grupo: dto.grupo,
        };

        let user = store.create_student(new_user, profile).await?;
        track_user_created(user.priv_usu);
        info!(user_id = user.id_usu, "Student registered");

        Ok(RegisteredUser {
            id_usu: user.id_usu,
            correo: user.correo_usu,
            priv_usu: user.priv_usu,
        })
    }

    #[instrument(skip(store))]
    pub async fn list_grouped(store: &dyn Store) -> Result<GroupedUsers, AppError> {
        Ok(store.list_users().await?.into_iter().collect())
    }

    /// Activates or deactivates an account. Deactivation also revokes the
    /// account's refresh token; outstanding access tokens run to expiry.
    #[instrument(skip(store, actor), fields(actor_id = actor.id))]
    pub async fn set_status(
        store: &dyn Store,
        actor: &AuthUser,
        user_id: i32,
        active: bool,
    ) -> Result<PublicUser, AppError> {
        if actor.id == user_id && !active {
            return Err(AppError::bad_request("No puedes desactivar tu propia cuenta"));
        }

        let user = store
            .set_user_status(user_id, active)
            .await?
            .ok_or_else(|| AppError::not_found("Usuario no encontrado"))?;

        info!(user_id, active, "User status changed");
        Ok(user.into())
    }
}
