use std::sync::LazyLock;

use classaccess_auth::{IssuedToken, TokenIssuer};
use classaccess_core::{AppError, hash_password, verify_password};
use classaccess_db::Store;
use classaccess_models::auth::LoginRequest;
use classaccess_models::users::User;
use tracing::{debug, info, instrument, warn};

use crate::metrics::{track_login_failure, track_login_success};

pub const INVALID_CREDENTIALS: &str = "Credenciales incorrectas";
pub const ACCOUNT_INACTIVE: &str = "Usuario inactivo";
pub const NO_ACTIVE_SESSION: &str = "No hay sesión activa";
pub const MISSING_REFRESH_TOKEN: &str = "Refresh token no proporcionado";
pub const INVALID_REFRESH_TOKEN: &str = "Refresh token inválido o expirado";

/// Verified against when the email is unknown, so both failure paths pay
/// for one bcrypt check at the default cost.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("classaccess-timing-placeholder").ok());

/// Tokens issued by a successful login, plus the account they belong to.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

pub struct AuthService;

impl AuthService {
    /// Verifies credentials and opens a session.
    ///
    /// A password hash is always checked, even for an unknown email, but an
    /// inactive account is refused with 403 whatever the outcome. The new
    /// refresh token replaces any previous one stored for the user.
    #[instrument(skip(store, tokens, dto), fields(correo = %dto.correo))]
    pub async fn login(
        store: &dyn Store,
        tokens: &TokenIssuer,
        dto: LoginRequest,
    ) -> Result<LoginOutcome, AppError> {
        let Some(user) = store.find_by_email(&dto.correo).await? else {
            let password = dto.password;
            tokio::task::spawn_blocking(move || {
                if let Some(hash) = DUMMY_HASH.as_deref() {
                    let _ = verify_password(&password, hash);
                }
            })
            .await?;
            track_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        let hash = user.password.clone();
        let password = dto.password;
        let valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;

        if !user.is_active() {
            track_login_failure("inactive");
            warn!(user_id = user.id_usu, "Login attempt on inactive account");
            return Err(AppError::forbidden(ACCOUNT_INACTIVE));
        }

        if !valid {
            track_login_failure("bad_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let access = tokens.issue_access_token(user.id_usu, &user.correo_usu, user.priv_usu)?;
        let refresh = tokens.issue_refresh_token(user.id_usu)?;
        store
            .save_refresh_token(user.id_usu, &refresh.token, refresh.expires_at)
            .await?;

        track_login_success(user.priv_usu);
        info!(user_id = user.id_usu, role = %user.priv_usu, "User logged in");

        Ok(LoginOutcome {
            user,
            access,
            refresh,
        })
    }

    /// Deletes the stored refresh token. A missing or unknown token means
    /// there was no session to close.
    #[instrument(skip_all)]
    pub async fn logout(store: &dyn Store, refresh_token: Option<String>) -> Result<(), AppError> {
        let token = refresh_token.ok_or_else(|| AppError::bad_request(NO_ACTIVE_SESSION))?;

        if !store.delete_refresh_token(&token).await? {
            debug!("Logout with a refresh token that is not stored");
            return Err(AppError::bad_request(NO_ACTIVE_SESSION));
        }

        info!("Session closed");
        Ok(())
    }

    /// Issues a new access token for a valid, still stored refresh token.
    ///
    /// The refresh token itself is not rotated. Role and email are read from
    /// storage so the new token reflects the account as it is now. An
    /// account deactivated since login gets 401, like any dead session.
    #[instrument(skip_all)]
    pub async fn refresh(
        store: &dyn Store,
        tokens: &TokenIssuer,
        refresh_token: Option<String>,
    ) -> Result<(User, IssuedToken), AppError> {
        let token = refresh_token.ok_or_else(|| AppError::unauthorized(MISSING_REFRESH_TOKEN))?;

        let claims = tokens.verify_refresh_token(&token).map_err(|err| {
            debug!(reason = %err, "Refresh token rejected");
            AppError::unauthorized(INVALID_REFRESH_TOKEN)
        })?;

        if !store.refresh_token_exists(&token).await? {
            return Err(AppError::unauthorized(INVALID_REFRESH_TOKEN));
        }

        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH_TOKEN))?;

        let user = store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH_TOKEN))?;

        if !user.is_active() {
            return Err(AppError::unauthorized(ACCOUNT_INACTIVE));
        }

        let access = tokens.issue_access_token(user.id_usu, &user.correo_usu, user.priv_usu)?;
        debug!(user_id = user.id_usu, "Access token refreshed");

        Ok((user, access))
    }
}
