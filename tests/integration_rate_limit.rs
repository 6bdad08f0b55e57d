mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use classaccess_config::RateLimitConfig;
use classaccess_core::Role;
use common::{
    TEST_PASSWORD, TestApp, access_token_for, create_test_user, generate_unique_email,
    setup_rate_limited_app,
};
use serde_json::json;

fn strict_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        general_per_second: 60,
        general_burst_size: 2,
        auth_per_second: 60,
        auth_burst_size: 1,
    }
}

fn login_from(ip: &str, email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            json!({ "correo": email, "password": password }).to_string(),
        ))
        .unwrap()
}

fn authed_get_from(ip: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

async fn admin_token(app: &TestApp) -> String {
    let admin = create_test_user(&app.store, &generate_unique_email(), Role::Admin, true).await;
    access_token_for(app, &admin)
}

#[tokio::test]
async fn test_login_rate_limit_exceeded() {
    let app = setup_rate_limited_app(strict_rate_limit_config());
    let email = generate_unique_email();
    create_test_user(&app.store, &email, Role::Student, true).await;

    let first = app.send(login_from("192.168.1.100", &email, "wrong-password")).await;
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    let second = app.send(login_from("192.168.1.100", &email, TEST_PASSWORD)).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_login_rate_limit_is_per_ip() {
    let app = setup_rate_limited_app(strict_rate_limit_config());
    let email = generate_unique_email();

    let first = app.send(login_from("10.0.0.1", &email, "wrong-password")).await;
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    let other_ip = app.send(login_from("10.0.0.2", &email, "wrong-password")).await;
    assert_eq!(other_ip.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_general_rate_limit_exceeded() {
    let app = setup_rate_limited_app(strict_rate_limit_config());
    let token = admin_token(&app).await;

    for _ in 0..2 {
        let response = app
            .send(authed_get_from("172.16.0.5", "/api/classrooms", &token))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let limited = app
        .send(authed_get_from("172.16.0.5", "/api/classrooms", &token))
        .await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let app = setup_rate_limited_app(strict_rate_limit_config());

    for _ in 0..5 {
        let response = app
            .send(
                Request::builder()
                    .uri("/health")
                    .header("x-forwarded-for", "172.16.0.9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_disabled_rate_limit_never_rejects() {
    let app = setup_rate_limited_app(RateLimitConfig::disabled());
    let email = generate_unique_email();

    for _ in 0..5 {
        let response = app.send(login_from("10.0.0.3", &email, "wrong-password")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
