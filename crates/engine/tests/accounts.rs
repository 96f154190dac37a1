use sea_orm::{Database, DatabaseConnection};

use engine::{CredentialsUpdate, Engine, EngineError, Identity, Role};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .token_secret("accounts-secret")
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn teacher(user_id: i32) -> Identity {
    Identity {
        user_id,
        role: Role::Teacher,
    }
}

fn admin(user_id: i32) -> Identity {
    Identity {
        user_id,
        role: Role::Admin,
    }
}

#[tokio::test]
async fn builder_requires_token_secret() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let result = Engine::builder().database(db).build().await;
    assert!(matches!(result, Err(EngineError::Validation(_))));
}

#[tokio::test]
async fn login_issues_token_that_authenticates() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_user("admin", "admin123", "Administrator", Role::Admin)
        .await
        .unwrap();

    let outcome = engine.login("admin", "admin123").await.unwrap();
    assert_eq!(outcome.user, created);

    let identity = engine.authenticate(&outcome.token).unwrap();
    assert_eq!(identity, admin(created.id));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_teacher("mrs.smith", "teach123", "Jane Smith")
        .await
        .unwrap();

    assert_eq!(
        engine.login("mrs.smith", "wrong").await,
        Err(EngineError::InvalidCredentials)
    );
    assert_eq!(
        engine.login("nobody", "teach123").await,
        Err(EngineError::InvalidCredentials)
    );
}

#[tokio::test]
async fn garbage_token_is_unauthenticated() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine.authenticate("not.a-token"),
        Err(EngineError::Unauthenticated(_))
    ));
}

#[tokio::test]
async fn duplicate_keys_are_reported_per_constraint() {
    let (engine, _db) = engine_with_db().await;
    let teacher = engine
        .create_teacher("mrs.smith", "teach123", "Jane Smith")
        .await
        .unwrap();
    assert_eq!(
        engine
            .create_teacher("mrs.smith", "other", "Someone Else")
            .await,
        Err(EngineError::DuplicateUsername)
    );

    let class = engine.create_class("Grade 10 A", "G10A").await.unwrap();
    assert_eq!(
        engine.create_class("Another", "G10A").await,
        Err(EngineError::DuplicateKey("Class code".to_string()))
    );

    let subject = engine.create_subject("Mathematics", "MATH").await.unwrap();
    assert_eq!(
        engine.create_subject("Maths", "MATH").await,
        Err(EngineError::DuplicateKey("Subject code".to_string()))
    );

    engine
        .create_student("Ada", "S-001", class.id)
        .await
        .unwrap();
    assert_eq!(
        engine.create_student("Ada Two", "S-001", class.id).await,
        Err(EngineError::DuplicateKey("Student ID".to_string()))
    );

    engine
        .create_assignment(teacher.id, class.id, subject.id)
        .await
        .unwrap();
    assert_eq!(
        engine
            .create_assignment(teacher.id, class.id, subject.id)
            .await,
        Err(EngineError::DuplicateKey("Assignment".to_string()))
    );
}

#[tokio::test]
async fn missing_references_are_not_found() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(
        engine.create_student("Ada", "S-001", 404).await,
        Err(EngineError::NotFound("Class".to_string()))
    );
    assert_eq!(
        engine.delete_subject(404).await,
        Err(EngineError::NotFound("Subject".to_string()))
    );
    assert_eq!(
        engine.delete_student(404).await,
        Err(EngineError::NotFound("Student".to_string()))
    );
    assert_eq!(
        engine.delete_assignment(404).await,
        Err(EngineError::NotFound("Assignment".to_string()))
    );
}

#[tokio::test]
async fn blank_required_fields_fail_validation() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine.create_class("  ", "G10A").await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine.create_teacher("mr.x", "", "Mr X").await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn listings_are_ordered_for_display() {
    let (engine, _db) = engine_with_db().await;
    let b = engine.create_class("B class", "B").await.unwrap();
    let a = engine.create_class("A class", "A").await.unwrap();
    engine.create_student("Zoe", "S-1", a.id).await.unwrap();
    engine.create_student("Yan", "S-2", b.id).await.unwrap();
    engine.create_student("Xia", "S-3", a.id).await.unwrap();

    let classes: Vec<_> = engine
        .list_classes()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(classes, ["A class", "B class"]);

    let students = engine.list_students(None).await.unwrap();
    let rows: Vec<_> = students
        .iter()
        .map(|s| (s.class_code.as_deref(), s.student_name.as_str()))
        .collect();
    assert_eq!(rows, [(Some("A"), "Xia"), (Some("A"), "Zoe"), (Some("B"), "Yan")]);

    let only_b = engine.list_students(Some(b.id)).await.unwrap();
    assert_eq!(only_b.len(), 1);
    assert_eq!(only_b[0].class_name.as_deref(), Some("B class"));
}

#[tokio::test]
async fn assignments_filter_by_teacher() {
    let (engine, _db) = engine_with_db().await;
    let smith = engine
        .create_teacher("smith", "pw", "Jane Smith")
        .await
        .unwrap();
    let adams = engine
        .create_teacher("adams", "pw", "Ann Adams")
        .await
        .unwrap();
    let class = engine.create_class("Grade 10 A", "G10A").await.unwrap();
    let math = engine.create_subject("Mathematics", "MATH").await.unwrap();
    let art = engine.create_subject("Art", "ART").await.unwrap();

    engine.create_assignment(smith.id, class.id, math.id).await.unwrap();
    engine.create_assignment(smith.id, class.id, art.id).await.unwrap();
    let created = engine.create_assignment(adams.id, class.id, math.id).await.unwrap();
    assert_eq!(created.teacher_name, "Ann Adams");
    assert_eq!(created.subject_code, "MATH");

    let all = engine.list_assignments(None).await.unwrap();
    let names: Vec<_> = all
        .iter()
        .map(|a| (a.teacher_name.as_str(), a.subject_name.as_str()))
        .collect();
    assert_eq!(
        names,
        [
            ("Ann Adams", "Mathematics"),
            ("Jane Smith", "Art"),
            ("Jane Smith", "Mathematics"),
        ]
    );

    let own = engine.teacher_assignments(smith.id).await.unwrap();
    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|a| a.teacher_id == smith.id));

    let teachers: Vec<_> = engine
        .list_teachers()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.full_name)
        .collect();
    assert_eq!(teachers, ["Ann Adams", "Jane Smith"]);
}

#[tokio::test]
async fn teacher_changes_own_password_with_current_password() {
    let (engine, _db) = engine_with_db().await;
    let me = engine
        .create_teacher("mrs.smith", "teach123", "Jane Smith")
        .await
        .unwrap();

    let missing = engine
        .update_credentials(
            teacher(me.id),
            me.id,
            CredentialsUpdate {
                password: Some("new-pass".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(missing, Err(EngineError::InvalidCurrentPassword));

    let wrong = engine
        .update_credentials(
            teacher(me.id),
            me.id,
            CredentialsUpdate {
                password: Some("new-pass".to_string()),
                current_password: Some("nope".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(wrong, Err(EngineError::InvalidCurrentPassword));

    let updated = engine
        .update_credentials(
            teacher(me.id),
            me.id,
            CredentialsUpdate {
                username: Some("jane".to_string()),
                password: Some("new-pass".to_string()),
                current_password: Some("teach123".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "jane");

    assert_eq!(
        engine.login("jane", "teach123").await,
        Err(EngineError::InvalidCredentials)
    );
    engine.login("jane", "new-pass").await.unwrap();
}

#[tokio::test]
async fn admin_resets_other_account_without_current_password() {
    let (engine, _db) = engine_with_db().await;
    let root = engine
        .create_user("admin", "admin123", "Administrator", Role::Admin)
        .await
        .unwrap();
    let target = engine
        .create_teacher("mrs.smith", "teach123", "Jane Smith")
        .await
        .unwrap();

    engine
        .update_credentials(
            admin(root.id),
            target.id,
            CredentialsUpdate {
                password: Some("reset".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    engine.login("mrs.smith", "reset").await.unwrap();

    let detail = engine.user_detail(admin(root.id), target.id).await.unwrap();
    assert!(detail.updated_at >= detail.created_at);
}

#[tokio::test]
async fn credential_rules_reject_bad_requests() {
    let (engine, _db) = engine_with_db().await;
    let smith = engine
        .create_teacher("smith", "pw", "Jane Smith")
        .await
        .unwrap();
    let adams = engine
        .create_teacher("adams", "pw", "Ann Adams")
        .await
        .unwrap();

    assert!(matches!(
        engine
            .update_credentials(
                teacher(smith.id),
                adams.id,
                CredentialsUpdate {
                    password: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert_eq!(
        engine
            .update_credentials(teacher(smith.id), smith.id, CredentialsUpdate::default())
            .await,
        Err(EngineError::NoChangesProvided)
    );
    assert_eq!(
        engine
            .update_credentials(
                teacher(smith.id),
                smith.id,
                CredentialsUpdate {
                    username: Some("adams".to_string()),
                    current_password: Some("pw".to_string()),
                    ..Default::default()
                },
            )
            .await,
        Err(EngineError::DuplicateUsername)
    );
    assert_eq!(
        engine
            .update_credentials(
                admin(smith.id),
                404,
                CredentialsUpdate {
                    password: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await,
        Err(EngineError::NotFound("User".to_string()))
    );
    assert!(matches!(
        engine.user_detail(teacher(smith.id), adams.id).await,
        Err(EngineError::Forbidden(_))
    ));
}
