mod common;

use axum::http::{StatusCode, header};
use chrono::Local;
use classaccess_core::Role;
use classaccess_db::AttendanceStore;
use common::{
    TestApp, access_token_for, authed_request, body_json, body_text, create_test_classroom,
    create_test_student, create_test_teacher, create_test_user, generate_unique_email,
    get_request, setup_test_app,
};

async fn scan(app: &TestApp, code: &str, room: i32) -> (StatusCode, String) {
    let response = app
        .send(get_request(&format!(
            "/api/attendance/register?id={code}&aula={room}"
        )))
        .await;
    let status = response.status();
    (status, body_text(response).await)
}

#[tokio::test]
async fn test_teacher_then_student_toggle_scenario() {
    let app = setup_test_app();
    let teacher = create_test_teacher(&app.store, "E100").await;
    let student = create_test_student(&app.store, "S200", "RFID-200").await;
    let room = create_test_classroom(&app.store, "Aula 5").await;
    let today = Local::now().date_naive();

    assert_eq!(
        scan(&app, "E100", room.id_aula).await,
        (StatusCode::OK, "PROFESOR_ENTRADA".to_string())
    );
    let teacher_records = app
        .store
        .records_for(teacher.id_usu, room.id_aula, today)
        .await
        .unwrap();
    assert_eq!(teacher_records.len(), 1);
    assert!(teacher_records[0].is_open());

    assert_eq!(scan(&app, "S200", room.id_aula).await.1, "ALUMNO_ENTRADA");
    assert_eq!(scan(&app, "RFID-200", room.id_aula).await.1, "ALUMNO_SALIDA");

    let records = app
        .store
        .records_for(student.id_usu, room.id_aula, today)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert!(records.iter().all(|r| !r.is_open()));

    assert_eq!(scan(&app, "E100", room.id_aula).await.1, "PROFESOR_SALIDA");

    // A closed teacher record still satisfies the precondition.
    assert_eq!(scan(&app, "S200", room.id_aula).await.1, "ALUMNO_ENTRADA");
    let records = app
        .store
        .records_for(student.id_usu, room.id_aula, today)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().filter(|r| r.is_open()).count(), 1);
}

#[tokio::test]
async fn test_student_without_teacher_present() {
    let app = setup_test_app();
    let student = create_test_student(&app.store, "S200", "RFID-200").await;
    let room = create_test_classroom(&app.store, "Aula 5").await;
    let other_room = create_test_classroom(&app.store, "Aula 6").await;
    create_test_teacher(&app.store, "E100").await;

    assert_eq!(scan(&app, "S200", room.id_aula).await.1, "NO_HAY_PROFESOR");

    // A teacher in another room does not count.
    assert_eq!(scan(&app, "E100", other_room.id_aula).await.1, "PROFESOR_ENTRADA");
    assert_eq!(scan(&app, "S200", room.id_aula).await.1, "NO_HAY_PROFESOR");

    let records = app
        .store
        .records_for(student.id_usu, room.id_aula, Local::now().date_naive())
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_unknown_identifier() {
    let app = setup_test_app();
    let room = create_test_classroom(&app.store, "Aula 5").await;
    create_test_teacher(&app.store, "E100").await;

    // Precondition is checked before the student lookup.
    assert_eq!(scan(&app, "ZZZ", room.id_aula).await.1, "NO_HAY_PROFESOR");

    scan(&app, "E100", room.id_aula).await;
    let (status, body) = scan(&app, "ZZZ", room.id_aula).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "NO_ENCONTRADO");
}

#[tokio::test]
async fn test_employee_number_wins_over_student_codes() {
    let app = setup_test_app();
    create_test_teacher(&app.store, "X1").await;
    create_test_student(&app.store, "X1", "RFID-X1").await;
    let room = create_test_classroom(&app.store, "Aula 5").await;

    assert_eq!(scan(&app, "X1", room.id_aula).await.1, "PROFESOR_ENTRADA");
}

#[tokio::test]
async fn test_register_bad_requests_are_plaintext() {
    let app = setup_test_app();

    for uri in [
        "/api/attendance/register",
        "/api/attendance/register?id=E100",
        "/api/attendance/register?aula=5",
        "/api/attendance/register?id=&aula=5",
        "/api/attendance/register?id=E100&aula=cinco",
    ] {
        let response = app.send(get_request(uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    }
}

#[tokio::test]
async fn test_register_storage_failure_is_plain_500() {
    let app = setup_test_app();
    create_test_teacher(&app.store, "E100").await;

    let (status, body) = scan(&app, "E100", 999).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error en el servidor");
}

#[tokio::test]
async fn test_student_history_access_rules() {
    let app = setup_test_app();
    create_test_teacher(&app.store, "E100").await;
    let student = create_test_student(&app.store, "S200", "RFID-200").await;
    let other = create_test_student(&app.store, "S201", "RFID-201").await;
    let room = create_test_classroom(&app.store, "Aula 5").await;
    scan(&app, "E100", room.id_aula).await;
    scan(&app, "S200", room.id_aula).await;

    let uri = format!("/api/students/{}/attendance", student.id_usu);

    let own = app
        .send(authed_request("GET", &uri, &access_token_for(&app, &student), None))
        .await;
    assert_eq!(own.status(), StatusCode::OK);
    let body = body_json(own).await;
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["nombre_aula"], "Aula 5");
    assert!(entries[0]["hora_salida"].is_null());

    let foreign = app
        .send(authed_request("GET", &uri, &access_token_for(&app, &other), None))
        .await;
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

    let teacher_email = generate_unique_email();
    let teacher = create_test_user(&app.store, &teacher_email, Role::Teacher, true).await;
    let staff = app
        .send(authed_request("GET", &uri, &access_token_for(&app, &teacher), None))
        .await;
    assert_eq!(staff.status(), StatusCode::OK);
}
