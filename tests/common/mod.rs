#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use classaccess::router::init_router;
use classaccess::state::AppState;
use classaccess_auth::TokenIssuer;
use classaccess_config::{CookieConfig, CorsConfig, JwtConfig, RateLimitConfig, TokenDelivery};
use classaccess_core::{Role, hash_password_with_cost};
use classaccess_db::{ClassroomStore, DeviceStore, MemoryStore, UserDirectory};
use classaccess_models::classrooms::{Classroom, ClassroomDto};
use classaccess_models::devices::Device;
use classaccess_models::users::{NewUser, StudentProfile, User};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "testpass123";

static EMAIL_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<TokenIssuer>,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "integration-access-secret".to_string(),
        refresh_secret: "integration-refresh-secret".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 7200,
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(CookieConfig::default())
}

pub fn setup_body_delivery_app() -> TestApp {
    setup_test_app_with(CookieConfig {
        delivery: TokenDelivery::Body,
        ..CookieConfig::default()
    })
}

pub fn setup_test_app_with(cookie_config: CookieConfig) -> TestApp {
    build_test_app(cookie_config, RateLimitConfig::disabled())
}

/// Requests must carry `x-forwarded-for`; the limiter keys on client IP.
pub fn setup_rate_limited_app(rate_limit_config: RateLimitConfig) -> TestApp {
    build_test_app(CookieConfig::default(), rate_limit_config)
}

fn build_test_app(cookie_config: CookieConfig, rate_limit_config: RateLimitConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let cors_config = CorsConfig {
        allowed_origins: vec!["http://localhost:5173".to_string()],
    };
    let state = AppState::new(
        store.clone(),
        &test_jwt_config(),
        cookie_config,
        cors_config,
        rate_limit_config,
    );
    let tokens = state.tokens.clone();

    TestApp {
        router: init_router(state),
        store,
        tokens,
    }
}

pub fn generate_unique_email() -> String {
    let n = EMAIL_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("user{n}@escuela.mx")
}

fn new_user(email: &str, role: Role, active: bool) -> NewUser {
    NewUser {
        nombre_usu: "Test".to_string(),
        ap_usu: "User".to_string(),
        am_usu: String::new(),
        correo_usu: email.to_string(),
        password_hash: hash_password_with_cost(TEST_PASSWORD, 4).unwrap(),
        priv_usu: role,
        estatus_usu: active,
    }
}

pub async fn create_test_user(store: &MemoryStore, email: &str, role: Role, active: bool) -> User {
    store.create_user(new_user(email, role, active)).await.unwrap()
}

pub async fn create_test_teacher(store: &MemoryStore, employee_number: &str) -> User {
    store
        .create_teacher(
            new_user(&generate_unique_email(), Role::Teacher, true),
            employee_number,
        )
        .await
        .unwrap()
}

pub async fn create_test_student(store: &MemoryStore, matricula: &str, cod_rfid: &str) -> User {
    let profile = StudentProfile {
        matricula: Some(matricula.to_string()),
        cod_rfid: Some(cod_rfid.to_string()),
        grupo: Some("3A".to_string()),
    };
    store
        .create_student(new_user(&generate_unique_email(), Role::Student, true), profile)
        .await
        .unwrap()
}

pub async fn create_test_classroom(store: &MemoryStore, name: &str) -> Classroom {
    store
        .create_classroom(ClassroomDto {
            nombre_aula: name.to_string(),
            edificio: "B".to_string(),
            id_dispositivo: None,
        })
        .await
        .unwrap()
}

pub async fn create_test_device(store: &MemoryStore, name: &str) -> Device {
    store.create_device(name).await.unwrap()
}

pub fn access_token_for(app: &TestApp, user: &User) -> String {
    app.tokens
        .issue_access_token(user.id_usu, &user.correo_usu, user.priv_usu)
        .unwrap()
        .token
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Every `Set-Cookie` header on the response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Value of the named cookie among `Set-Cookie` headers.
pub fn cookie_value(set_cookies: &[String], name: &str) -> Option<String> {
    set_cookies.iter().find_map(|cookie| {
        let pair = cookie.split(';').next()?;
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

pub fn cookie_header(set_cookies: &[String], name: &str) -> Option<String> {
    set_cookies
        .iter()
        .find(|cookie| cookie.starts_with(&format!("{name}=")))
        .cloned()
}

pub async fn login(app: &TestApp, email: &str) -> Response<Body> {
    app.send(json_request(
        "POST",
        "/api/auth/login",
        &serde_json::json!({ "correo": email, "password": TEST_PASSWORD }),
    ))
    .await
}
