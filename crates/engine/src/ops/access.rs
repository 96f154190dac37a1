use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, Role, classes, subjects, teacher_assignments, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i32,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("User".to_string()))
    }

    /// A user row that holds the teacher role; admins do not qualify.
    pub(super) async fn require_teacher<C: ConnectionTrait>(
        &self,
        db: &C,
        teacher_id: i32,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(teacher_id)
            .filter(users::Column::Role.eq(Role::Teacher.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("Teacher".to_string()))
    }

    pub(super) async fn require_class<C: ConnectionTrait>(
        &self,
        db: &C,
        class_id: i32,
    ) -> ResultEngine<classes::Model> {
        classes::Entity::find_by_id(class_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("Class".to_string()))
    }

    pub(super) async fn require_subject<C: ConnectionTrait>(
        &self,
        db: &C,
        subject_id: i32,
    ) -> ResultEngine<subjects::Model> {
        subjects::Entity::find_by_id(subject_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("Subject".to_string()))
    }

    /// Fails with `NotAssigned` unless the teacher holds the (class, subject) grant.
    pub(super) async fn require_assignment<C: ConnectionTrait>(
        &self,
        db: &C,
        teacher_id: i32,
        class_id: i32,
        subject_id: i32,
    ) -> ResultEngine<()> {
        let assigned = teacher_assignments::Entity::find()
            .filter(teacher_assignments::Column::TeacherId.eq(teacher_id))
            .filter(teacher_assignments::Column::ClassId.eq(class_id))
            .filter(teacher_assignments::Column::SubjectId.eq(subject_id))
            .one(db)
            .await?
            .is_some();
        if !assigned {
            return Err(EngineError::NotAssigned);
        }
        Ok(())
    }
}
