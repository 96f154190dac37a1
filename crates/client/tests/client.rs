use api_types::{
    Role,
    attendance::{AttendanceEntry, AttendanceSubmit, HistoryQuery, StatsQuery},
    user::CredentialsUpdate,
};
use chrono::{Duration, Utc};
use client::{Client, ClientError, Session};
use engine::{Engine, Identity, TokenSigner};
use migration::MigratorTrait;
use sea_orm::Database;
use server::ServerOptions;

const SECRET: &str = "client-test-secret";

async fn start_server() -> Client {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .token_secret(SECRET)
        .build()
        .await
        .unwrap();
    engine
        .create_user("admin", "admin123", "Administrator", engine::Role::Admin)
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, ServerOptions::default(), listener).unwrap();
    Client::new(&format!("http://{addr}")).unwrap()
}

fn submission(class_id: i32, subject_id: i32, entries: &[(i32, &str)]) -> AttendanceSubmit {
    AttendanceSubmit {
        class_id: Some(class_id),
        subject_id: Some(subject_id),
        date: Some("2026-03-02".to_string()),
        attendance: Some(
            entries
                .iter()
                .map(|(student_id, status)| AttendanceEntry {
                    student_id: *student_id,
                    status: status.to_string(),
                })
                .collect(),
        ),
        lecture_start_time: Some("09:00".to_string()),
        lecture_end_time: Some("09:45".to_string()),
    }
}

#[tokio::test]
async fn login_opens_a_day_long_session() {
    let client = start_server().await;
    assert_eq!(client.health().await.unwrap().status, "ok");

    let session = client.login("admin", "admin123").await.unwrap();
    assert_eq!(session.user().role, Role::Admin);
    let remaining = session.expires_at() - Utc::now();
    assert!(remaining > Duration::hours(23) && remaining <= Duration::hours(24));

    let profile = client.profile(&session).await.unwrap();
    assert_eq!(profile.user_id, session.user().id);
    assert_eq!(profile.role, Role::Admin);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let client = start_server().await;
    let err = client.login("admin", "nope").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(ref msg) if msg == "Invalid credentials"));
}

#[tokio::test]
async fn expired_session_fails_before_sending() {
    let client = start_server().await;
    let fresh = client.login("admin", "admin123").await.unwrap();

    let signer = TokenSigner::new(SECRET).unwrap();
    let stale = signer
        .issue(
            Identity {
                user_id: fresh.user().id,
                role: engine::Role::Admin,
            },
            Utc::now() - Duration::hours(25),
        )
        .unwrap();
    let session = Session::new(stale, fresh.user().clone()).unwrap();

    assert!(session.is_expired(Utc::now()));
    assert!(matches!(
        client.classes(&session).await,
        Err(ClientError::SessionExpired)
    ));
}

#[tokio::test]
async fn school_day_round_trip() {
    let client = start_server().await;
    let admin = client.login("admin", "admin123").await.unwrap();

    let class = client.create_class(&admin, "Grade 10 A", "G10A").await.unwrap();
    let subject = client
        .create_subject(&admin, "Mathematics", "MATH")
        .await
        .unwrap();
    let ada = client
        .create_student(&admin, "Ada", "S-001", class.id)
        .await
        .unwrap();
    let brian = client
        .create_student(&admin, "Brian", "S-002", class.id)
        .await
        .unwrap();
    let teacher = client
        .create_teacher(&admin, "mrs.smith", "teach123", "Jane Smith")
        .await
        .unwrap();
    client
        .create_assignment(&admin, teacher.id, class.id, subject.id)
        .await
        .unwrap();

    let duplicate = client.create_class(&admin, "Other", "G10A").await.unwrap_err();
    assert!(matches!(duplicate, ClientError::BadRequest(_)));
    assert_eq!(client.students(&admin, Some(class.id)).await.unwrap().len(), 2);

    let session = client.login("mrs.smith", "teach123").await.unwrap();
    let mine = client.my_assignments(&session).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].class_code, "G10A");

    let roster = client.roster(&session, class.id, subject.id).await.unwrap();
    let names: Vec<&str> = roster.iter().map(|s| s.student_name.as_str()).collect();
    assert_eq!(names, ["Ada", "Brian"]);

    let submit = submission(
        class.id,
        subject.id,
        &[(ada.id, "present"), (brian.id, "absent")],
    );
    let submitted = client.submit_attendance(&session, &submit).await.unwrap();
    assert!(submitted.session_id > 0);

    let again = client.submit_attendance(&session, &submit).await.unwrap_err();
    assert!(
        matches!(again, ClientError::BadRequest(ref msg) if msg == "Attendance already submitted for this date")
    );

    let history = client
        .attendance_history(&session, &HistoryQuery::default())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].present_count, 1);
    assert_eq!(history[0].absent_count, 1);

    let forbidden = client.classes(&session).await.unwrap_err();
    assert!(matches!(forbidden, ClientError::Forbidden(_)));

    let stats = client
        .student_stats(
            &admin,
            &StatsQuery {
                class_id: Some(class.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].student_name, "Ada");
    assert_eq!(stats[0].attendance_rate, 100.0);
    assert_eq!(stats[1].attendance_rate, 0.0);
}

#[tokio::test]
async fn teacher_changes_own_password() {
    let client = start_server().await;
    let admin = client.login("admin", "admin123").await.unwrap();
    let teacher = client
        .create_teacher(&admin, "mr.jones", "first-pass", "Tom Jones")
        .await
        .unwrap();
    let session = client.login("mr.jones", "first-pass").await.unwrap();

    let missing_current = client
        .update_credentials(
            &session,
            teacher.id,
            &CredentialsUpdate {
                password: Some("second-pass".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(missing_current, ClientError::Unauthorized(_)));

    let updated = client
        .update_credentials(
            &session,
            teacher.id,
            &CredentialsUpdate {
                password: Some("second-pass".to_string()),
                current_password: Some("first-pass".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.user.username, "mr.jones");

    assert!(client.login("mr.jones", "second-pass").await.is_ok());
    let detail = client.user_detail(&admin, teacher.id).await.unwrap();
    assert!(detail.updated_at >= detail.created_at);

    let other = client.user_detail(&session, admin.user().id).await.unwrap_err();
    assert!(matches!(other, ClientError::Forbidden(_)));
}
