mod common;

use axum::http::StatusCode;
use classaccess_core::Role;
use common::{
    access_token_for, authed_request, body_json, create_test_classroom, create_test_device,
    create_test_user, generate_unique_email, get_request, setup_test_app,
};
use serde_json::json;

#[tokio::test]
async fn test_admin_creates_and_lists_classrooms() {
    let app = setup_test_app();
    let admin = create_test_user(&app.store, &generate_unique_email(), Role::Admin, true).await;
    let token = access_token_for(&app, &admin);
    let device = create_test_device(&app.store, "Lector B-1").await;

    for (name, building) in [("Lab 1", "C"), ("Aula 2", "A"), ("Aula 1", "A")] {
        let response = app
            .send(authed_request(
                "POST",
                "/api/classrooms",
                &token,
                Some(&json!({
                    "nombre_aula": name,
                    "edificio": building,
                    "id_dispositivo": device.id_dispositivo,
                })),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .send(authed_request("GET", "/api/classrooms", &token, None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|room| room["nombre_aula"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Aula 1", "Aula 2", "Lab 1"]);
}

#[tokio::test]
async fn test_classroom_conflict_and_validation() {
    let app = setup_test_app();
    let admin = create_test_user(&app.store, &generate_unique_email(), Role::Admin, true).await;
    let token = access_token_for(&app, &admin);
    let payload = json!({ "nombre_aula": "Aula 1", "edificio": "A" });

    app.send(authed_request("POST", "/api/classrooms", &token, Some(&payload)))
        .await;
    let duplicate = app
        .send(authed_request("POST", "/api/classrooms", &token, Some(&payload)))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let invalid = app
        .send(authed_request(
            "POST",
            "/api/classrooms",
            &token,
            Some(&json!({ "nombre_aula": "", "edificio": "A" })),
        ))
        .await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_classroom_with_unknown_device_is_rejected() {
    let app = setup_test_app();
    let admin = create_test_user(&app.store, &generate_unique_email(), Role::Admin, true).await;

    let response = app
        .send(authed_request(
            "POST",
            "/api/classrooms",
            &access_token_for(&app, &admin),
            Some(&json!({ "nombre_aula": "Aula 1", "edificio": "A", "id_dispositivo": 99 })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_updates_classroom() {
    let app = setup_test_app();
    let admin = create_test_user(&app.store, &generate_unique_email(), Role::Admin, true).await;
    let token = access_token_for(&app, &admin);
    let room = create_test_classroom(&app.store, "Aula 1").await;
    let device = create_test_device(&app.store, "Lector A-1").await;

    let response = app
        .send(authed_request(
            "PUT",
            &format!("/api/classrooms/{}", room.id_aula),
            &token,
            Some(&json!({
                "nombre_aula": "Aula 1 bis",
                "edificio": "A",
                "id_dispositivo": device.id_dispositivo,
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id_aula"], room.id_aula);
    assert_eq!(body["data"]["nombre_aula"], "Aula 1 bis");
    assert_eq!(body["data"]["id_dispositivo"], device.id_dispositivo);

    let missing = app
        .send(authed_request(
            "PUT",
            "/api/classrooms/999",
            &token,
            Some(&json!({ "nombre_aula": "Aula 9", "edificio": "A" })),
        ))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_classroom_update_conflict() {
    let app = setup_test_app();
    let admin = create_test_user(&app.store, &generate_unique_email(), Role::Admin, true).await;
    let token = access_token_for(&app, &admin);
    create_test_classroom(&app.store, "Aula 1").await;
    let second = create_test_classroom(&app.store, "Aula 2").await;

    // Both fixtures share building "B".
    let response = app
        .send(authed_request(
            "PUT",
            &format!("/api/classrooms/{}", second.id_aula),
            &token,
            Some(&json!({ "nombre_aula": "Aula 1", "edificio": "B" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let unchanged = app
        .send(authed_request(
            "PUT",
            &format!("/api/classrooms/{}", second.id_aula),
            &token,
            Some(&json!({ "nombre_aula": "Aula 2", "edificio": "B" })),
        ))
        .await;
    assert_eq!(unchanged.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_classrooms_require_admin() {
    let app = setup_test_app();
    let student = create_test_user(&app.store, &generate_unique_email(), Role::Student, true).await;

    let response = app
        .send(authed_request(
            "POST",
            "/api/classrooms",
            &access_token_for(&app, &student),
            Some(&json!({ "nombre_aula": "Aula 1", "edificio": "A" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let anonymous = app.send(get_request("/api/classrooms")).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_disabled_metrics() {
    let app = setup_test_app();

    let health = app.send(get_request("/health")).await;
    assert_eq!(health.status(), StatusCode::OK);
    let body = body_json(health).await;
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());

    let metrics = app.send(get_request("/metrics")).await;
    assert_eq!(metrics.status(), StatusCode::NOT_FOUND);
}
