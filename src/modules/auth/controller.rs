use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use classaccess_core::{ApiResponse, AppError};
use classaccess_models::auth::{
    LoginData, LoginRequest, RefreshData, RefreshTokenBody, SessionIdentity, SessionStatus,
    UserData,
};
use tracing::instrument;

use super::cookies;
use super::service::AuthService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Cookie first, then a JSON body of the form `{"refreshToken": "..."}`.
fn presented_refresh_token(jar: &CookieJar, body: &[u8]) -> Option<String> {
    cookies::refresh_cookie(jar).or_else(|| {
        serde_json::from_slice::<RefreshTokenBody>(body)
            .ok()
            .and_then(|body| body.refresh_token)
            .filter(|token| !token.is_empty())
    })
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginData>>), AppError> {
    let outcome = AuthService::login(state.store.as_ref(), &state.tokens, dto).await?;
    let config = &state.cookie_config;

    let (jar, data) = if config.uses_cookies() {
        let profile = UserData::from(&outcome.user);
        let jar = cookies::with_session(jar, config, &outcome.access, &outcome.refresh, &profile)?;
        let data = LoginData {
            user: outcome.user.into(),
            access_token: None,
            refresh_token: None,
        };
        (jar, data)
    } else {
        let data = LoginData {
            user: outcome.user.into(),
            access_token: Some(outcome.access.token),
            refresh_token: Some(outcome.refresh.token),
        };
        (jar, data)
    };

    Ok((jar, Json(ApiResponse::ok("Inicio de sesión exitoso", data))))
}

/// Cookies are cleared even when there was no session to close.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar, body: Bytes) -> Response {
    let token = presented_refresh_token(&jar, &body);
    let result = AuthService::logout(state.store.as_ref(), token).await;
    let jar = cookies::clear_session(jar, &state.cookie_config);

    match result {
        Ok(()) => (
            jar,
            Json(ApiResponse::message("Sesión cerrada correctamente")),
        )
            .into_response(),
        Err(err) => (jar, err).into_response(),
    }
}

#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<ApiResponse<RefreshData>>), AppError> {
    let token = presented_refresh_token(&jar, &body);
    let (_, access) = AuthService::refresh(state.store.as_ref(), &state.tokens, token).await?;
    let config = &state.cookie_config;

    let (jar, data) = if config.uses_cookies() {
        (cookies::with_access(jar, config, &access), None)
    } else {
        let data = RefreshData {
            access_token: access.token,
        };
        (jar, Some(data))
    };

    Ok((
        jar,
        Json(ApiResponse {
            success: true,
            message: "Token renovado".to_string(),
            data,
        }),
    ))
}

/// Reports whether the caller carries a valid access token. Never fails.
pub async fn session(user: Option<AuthUser>) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: user.is_some(),
        user: user.map(|user| SessionIdentity {
            id: user.id,
            correo: user.email,
            priv_usu: user.role,
        }),
    })
}
