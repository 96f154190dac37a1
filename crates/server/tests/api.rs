use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, Identity, Role, TokenSigner};
use migration::MigratorTrait;
use server::ServerOptions;

const SECRET: &str = "api-test-secret";

struct TestApp {
    router: Router,
    teacher_id: i32,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .token_secret(SECRET)
        .build()
        .await
        .unwrap();
    engine
        .create_user("admin", "admin123", "Administrator", Role::Admin)
        .await
        .unwrap();
    let teacher = engine
        .create_teacher("mrs.smith", "teach123", "Jane Smith")
        .await
        .unwrap();

    TestApp {
        router: server::router(engine, ServerOptions::default()),
        teacher_id: teacher.id,
    }
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

/// Creates class, subject, two students and the teacher's assignment.
async fn seed_school(app: &TestApp, admin: &str) -> (i64, i64, Vec<i64>) {
    let (status, class) = send(
        app,
        Method::POST,
        "/api/admin/classes",
        Some(admin),
        Some(json!({ "className": "Grade 10 A", "classCode": "G10A" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{class}");
    let class_id = class["id"].as_i64().unwrap();

    let (_, subject) = send(
        app,
        Method::POST,
        "/api/admin/subjects",
        Some(admin),
        Some(json!({ "subjectName": "Mathematics", "subjectCode": "MATH" })),
    )
    .await;
    let subject_id = subject["id"].as_i64().unwrap();

    let mut students = Vec::new();
    for (name, number) in [("Ada", "S-001"), ("Brian", "S-002")] {
        let (status, student) = send(
            app,
            Method::POST,
            "/api/admin/students",
            Some(admin),
            Some(json!({ "studentName": name, "studentId": number, "classId": class_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{student}");
        students.push(student["id"].as_i64().unwrap());
    }

    let (status, assignment) = send(
        app,
        Method::POST,
        "/api/admin/assignments",
        Some(admin),
        Some(json!({ "teacherId": app.teacher_id, "classId": class_id, "subjectId": subject_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{assignment}");
    assert_eq!(assignment["teacherName"], "Jane Smith");

    (class_id, subject_id, students)
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unknown_route_is_404_json() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));
}

#[tokio::test]
async fn preflight_bypasses_auth() {
    let app = test_app().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/admin/classes")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS, PATCH"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
}

#[tokio::test]
async fn error_responses_carry_cors_headers() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/api/admin/classes")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(
        response.headers()[header::CACHE_CONTROL]
            .to_str()
            .unwrap()
            .starts_with("no-store")
    );
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_missing_fields() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_returns_profile_and_usable_token() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "mrs.smith", "password": "teach123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["fullName"], "Jane Smith");
    assert_eq!(body["user"]["role"], "teacher");

    let token = body["token"].as_str().unwrap();
    let (status, profile) = send(&app, Method::GET, "/api/auth/profile", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile, json!({ "userId": app.teacher_id, "role": "teacher" }));
}

#[tokio::test]
async fn token_problems_are_401() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access token required");

    let (status, _) = send(&app, Method::GET, "/api/auth/profile", Some("junk"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let stale = TokenSigner::new(SECRET)
        .unwrap()
        .issue(
            Identity {
                user_id: app.teacher_id,
                role: Role::Teacher,
            },
            Utc::now() - Duration::hours(25),
        )
        .unwrap();
    let (status, body) = send(&app, Method::GET, "/api/auth/profile", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token expired");
}

#[tokio::test]
async fn role_gate_separates_admin_and_teacher_routes() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    let teacher = login(&app, "mrs.smith", "teach123").await;

    let (status, body) = send(&app, Method::GET, "/api/admin/classes", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");

    let (status, _) = send(&app, Method::GET, "/api/teacher/assignments", Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/api/admin/classes", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_crud_reports_duplicates_and_missing_rows() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    let (class_id, _, _) = seed_school(&app, &admin).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/classes",
        Some(&admin),
        Some(json!({ "className": "Again", "classCode": "G10A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Class code already exists");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/classes",
        Some(&admin),
        Some(json!({ "className": "No code" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, students) = send(&app, Method::GET, "/api/admin/students", Some(&admin), None).await;
    assert_eq!(students.as_array().unwrap().len(), 2);
    assert_eq!(students[0]["classCode"], "G10A");
    assert_eq!(students[0]["studentId"], "S-001");

    let (_, teachers) = send(&app, Method::GET, "/api/admin/teachers", Some(&admin), None).await;
    assert_eq!(teachers[0]["username"], "mrs.smith");

    let uri = format!("/api/admin/classes/{class_id}");
    let (status, body) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Class deleted successfully");

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Class not found");

    let uri = format!("/api/admin/students?classId={class_id}");
    let (_, students) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(students, json!([]));
}

#[tokio::test]
async fn teacher_submits_once_per_date_and_admin_sees_it() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    let teacher = login(&app, "mrs.smith", "teach123").await;
    let (class_id, subject_id, students) = seed_school(&app, &admin).await;

    let uri = format!("/api/teacher/students?classId={class_id}&subjectId={subject_id}");
    let (status, roster) = send(&app, Method::GET, &uri, Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster.as_array().unwrap().len(), 2);

    let submission = json!({
        "classId": class_id,
        "subjectId": subject_id,
        "date": "2024-01-10",
        "lectureStartTime": "09:00",
        "lectureEndTime": "10:00",
        "attendance": [
            { "studentId": students[0], "status": "present" },
            { "studentId": students[1], "status": "absent" },
        ],
    });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/teacher/attendance",
        Some(&teacher),
        Some(submission.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["sessionId"].as_i64().unwrap() > 0);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/teacher/attendance",
        Some(&teacher),
        Some(submission),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Attendance already submitted for this date");

    let (_, history) = send(
        &app,
        Method::GET,
        "/api/teacher/attendance/history",
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(history[0]["totalStudents"], 2);
    assert_eq!(history[0]["presentCount"], 1);
    assert_eq!(history[0]["lectureStartTime"], "09:00:00");

    let (_, records) = send(
        &app,
        Method::GET,
        "/api/admin/attendance?date=2024-01-10",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(records[0]["teacherName"], "Jane Smith");
    assert_eq!(records[0]["records"][1]["status"], "absent");

    let uri = format!("/api/admin/attendance/student-stats?classId={class_id}");
    let (_, stats) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(stats[0]["studentName"], "Ada");
    assert_eq!(stats[0]["attendanceRate"], 100.0);
    assert_eq!(stats[1]["absentCount"], 1);
}

#[tokio::test]
async fn unassigned_submission_is_forbidden() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    let teacher = login(&app, "mrs.smith", "teach123").await;
    let (class_id, _, students) = seed_school(&app, &admin).await;

    let (_, other) = send(
        &app,
        Method::POST,
        "/api/admin/subjects",
        Some(&admin),
        Some(json!({ "subjectName": "Physics", "subjectCode": "PHYS" })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/teacher/attendance",
        Some(&teacher),
        Some(json!({
            "classId": class_id,
            "subjectId": other["id"],
            "date": "2024-01-10",
            "attendance": [{ "studentId": students[0], "status": "present" }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "You are not assigned to this class-subject combination"
    );
}

#[tokio::test]
async fn invalid_submission_payloads_are_400() {
    let app = test_app().await;
    let teacher = login(&app, "mrs.smith", "teach123").await;

    for body in [
        json!({ "classId": 1, "subjectId": 1, "date": "2024-01-10" }),
        json!({ "classId": 1, "subjectId": 1, "date": "2024-01-10", "attendance": [] }),
        json!({
            "classId": 1, "subjectId": 1, "date": "10/01/2024",
            "attendance": [{ "studentId": 1, "status": "present" }],
        }),
        json!({
            "classId": 1, "subjectId": 1, "date": "2024-01-10",
            "attendance": [{ "studentId": 1, "status": "late" }],
        }),
    ] {
        let (status, response) = send(
            &app,
            Method::POST,
            "/api/teacher/attendance",
            Some(&teacher),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{response}");
    }
}

#[tokio::test]
async fn malformed_input_gets_a_json_error_body() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    let teacher = login(&app, "mrs.smith", "teach123").await;

    let cases = [
        (Method::DELETE, "/api/admin/classes/abc", &admin, None),
        (Method::GET, "/api/admin/students?classId=abc", &admin, None),
        (
            Method::POST,
            "/api/teacher/attendance",
            &teacher,
            Some(json!({
                "classId": 1, "subjectId": 1, "date": "2024-01-10",
                "attendance": [{ "studentId": 1 }],
            })),
        ),
        (
            Method::POST,
            "/api/teacher/attendance",
            &teacher,
            Some(json!({
                "classId": "one", "subjectId": 1, "date": "2024-01-10",
                "attendance": [{ "studentId": 1, "status": "present" }],
            })),
        ),
    ];
    for (method, uri, token, body) in cases {
        let (status, response) = send(&app, method, uri, Some(token), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {response}");
        assert!(response["error"].is_string(), "{uri}: {response}");
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/classes")
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string(), "{body}");
}

#[tokio::test]
async fn credentials_follow_ownership_rules() {
    let app = test_app().await;
    let teacher = login(&app, "mrs.smith", "teach123").await;
    let admin = login(&app, "admin", "admin123").await;
    let own = format!("/api/users/{}/credentials", app.teacher_id);

    let (status, _) = send(
        &app,
        Method::PUT,
        &own,
        Some(&teacher),
        Some(json!({ "password": "fresh" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/users/1/credentials",
        Some(&teacher),
        Some(json!({ "password": "fresh" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can only update your own credentials");

    let (status, body) = send(
        &app,
        Method::PUT,
        &own,
        Some(&teacher),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No updates provided");

    let (status, body) = send(
        &app,
        Method::PUT,
        &own,
        Some(&teacher),
        Some(json!({ "password": "fresh", "currentPassword": "teach123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Credentials updated successfully");
    assert_eq!(body["user"]["username"], "mrs.smith");

    login(&app, "mrs.smith", "fresh").await;

    let uri = format!("/api/users/{}", app.teacher_id);
    let (status, detail) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["fullName"], "Jane Smith");
    assert!(detail["updatedAt"].is_string());
}
