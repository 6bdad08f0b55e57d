//! Session middleware.
//!
//! `require_auth` ends the request with 401 when no token is presented or
//! the token fails verification. `optional_auth` lets the request continue
//! anonymously in both cases. Neither touches storage.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use classaccess_auth::AccessClaims;
use classaccess_core::{AppError, Role};
use tracing::debug;

use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "accessToken";

const MISSING_TOKEN: &str = "Token no proporcionado";
const INVALID_TOKEN: &str = "Token inválido o expirado";

/// Authenticated identity attached to the request by the session middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn from_claims(claims: AccessClaims) -> Option<Self> {
        Some(Self {
            id: claims.user_id()?,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Cookie first, then `Authorization: Bearer`.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(ACCESS_COOKIE)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, AppError> {
    let token =
        extract_access_token(headers).ok_or_else(|| AppError::unauthorized(MISSING_TOKEN))?;

    let claims = state.tokens.verify_access_token(&token).map_err(|err| {
        debug!(reason = %err, "Access token rejected");
        AppError::unauthorized(INVALID_TOKEN)
    })?;

    AuthUser::from_claims(claims).ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, req.headers())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Ok(user) = authenticate(&state, req.headers()) {
        req.extensions_mut().insert(user);
    }
    next.run(req).await
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(MISSING_TOKEN))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthUser>().cloned())
    }
}
