use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Extension, Router, middleware};
use classaccess::middleware::auth::AuthUser;
use classaccess::middleware::role::{
    ADMIN_ONLY, STAFF, check_any_role, check_self_or_staff, require_admin,
};
use classaccess_core::Role;
use tower::ServiceExt;

fn user(role: Role) -> AuthUser {
    AuthUser {
        id: 1,
        email: "test@escuela.mx".to_string(),
        role,
    }
}

#[test]
fn test_check_any_role_sets() {
    assert!(check_any_role(&user(Role::Admin), ADMIN_ONLY).is_ok());
    assert!(check_any_role(&user(Role::Teacher), ADMIN_ONLY).is_err());
    assert!(check_any_role(&user(Role::Teacher), STAFF).is_ok());
    assert!(check_any_role(&user(Role::Student), STAFF).is_err());
    assert!(check_any_role(&user(Role::Admin), &[]).is_err());
}

#[test]
fn test_check_any_role_mismatch_is_forbidden() {
    let err = check_any_role(&user(Role::Student), ADMIN_ONLY).unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);
}

#[test]
fn test_self_or_staff() {
    assert!(check_self_or_staff(&user(Role::Student), 1).is_ok());
    assert!(check_self_or_staff(&user(Role::Teacher), 2).is_ok());
    assert!(check_self_or_staff(&user(Role::Admin), 2).is_ok());

    let err = check_self_or_staff(&user(Role::Student), 2).unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);
}

async fn status_for(router: Router) -> StatusCode {
    router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_gate_without_identity_is_unauthorized() {
    let router = Router::new()
        .route("/", get(|| async { "ok" }))
        .route_layer(middleware::from_fn(require_admin));

    assert_eq!(status_for(router).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gate_with_identity() {
    let gated = |role: Role| {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(require_admin))
            .layer(Extension(user(role)))
    };

    assert_eq!(status_for(gated(Role::Student)).await, StatusCode::FORBIDDEN);
    assert_eq!(status_for(gated(Role::Teacher)).await, StatusCode::FORBIDDEN);
    assert_eq!(status_for(gated(Role::Admin)).await, StatusCode::OK);
}
