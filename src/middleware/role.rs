//! Role gate.
//!
//! Layer it after [`require_auth`](crate::middleware::auth::require_auth).
//! It answers 401 when no identity is attached and 403 when the identity's
//! role is outside the allowed set.

use axum::{extract::Request, middleware::Next, response::Response};
use classaccess_core::{AppError, Role};

use crate::middleware::auth::AuthUser;

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const STAFF: &[Role] = &[Role::Teacher, Role::Admin];

pub async fn require_roles(
    req: Request,
    next: Next,
    allowed: &[Role],
) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::unauthorized("No autenticado"))?;

    check_any_role(user, allowed)?;

    Ok(next.run(req).await)
}

/// Use with `middleware::from_fn` on administrator routes.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    require_roles(req, next, ADMIN_ONLY).await
}

pub fn check_any_role(user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::forbidden("Acceso denegado"))
    }
}

/// Staff, or the user acting on their own record.
pub fn check_self_or_staff(user: &AuthUser, target_id: i32) -> Result<(), AppError> {
    if user.id == target_id {
        return Ok(());
    }
    check_any_role(user, STAFF)
}
