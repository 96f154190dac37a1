use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, FromQueryResult, Statement, Value, prelude::*};

use crate::{Assignment, EngineError, ResultEngine, teacher_assignments};

use super::{Engine, ensure_deleted, on_unique};

const ASSIGNMENT_LISTING: &str = "SELECT ta.id, ta.teacher_id, ta.class_id, ta.subject_id, \
     u.full_name AS teacher_name, c.class_name, c.class_code, \
     s.subject_name, s.subject_code, ta.created_at \
     FROM teacher_assignments ta \
     JOIN users u ON u.id = ta.teacher_id \
     JOIN classes c ON c.id = ta.class_id \
     JOIN subjects s ON s.id = ta.subject_id";

impl Engine {
    /// All assignments, by teacher, class and subject name. With a
    /// `teacher_id` only that teacher's grants are listed, by class then
    /// subject.
    pub async fn list_assignments(&self, teacher_id: Option<i32>) -> ResultEngine<Vec<Assignment>> {
        let mut sql = ASSIGNMENT_LISTING.to_string();
        let mut values: Vec<Value> = Vec::new();
        match teacher_id {
            Some(teacher_id) => {
                sql.push_str(" WHERE ta.teacher_id = ? ORDER BY c.class_name, s.subject_name, ta.id");
                values.push(teacher_id.into());
            }
            None => {
                sql.push_str(" ORDER BY u.full_name, c.class_name, s.subject_name, ta.id");
            }
        }
        self.fetch_assignments(&self.database, sql, values).await
    }

    /// Grants a teacher the right to record attendance for (class, subject).
    pub async fn create_assignment(
        &self,
        teacher_id: i32,
        class_id: i32,
        subject_id: i32,
    ) -> ResultEngine<Assignment> {
        self.require_teacher(&self.database, teacher_id).await?;
        self.require_class(&self.database, class_id).await?;
        self.require_subject(&self.database, subject_id).await?;

        let active = teacher_assignments::ActiveModel {
            teacher_id: ActiveValue::Set(teacher_id),
            class_id: ActiveValue::Set(class_id),
            subject_id: ActiveValue::Set(subject_id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let model = active.insert(&self.database).await.map_err(|err| {
            on_unique(err, || EngineError::DuplicateKey("Assignment".to_string()))
        })?;

        tracing::info!(assignment_id = model.id, teacher_id, class_id, subject_id, "assignment created");
        self.assignment_by_id(model.id).await
    }

    /// Removes an assignment. Sessions already submitted under it remain.
    pub async fn delete_assignment(&self, assignment_id: i32) -> ResultEngine<Assignment> {
        let assignment = self.assignment_by_id(assignment_id).await?;
        let deleted = teacher_assignments::Entity::delete_by_id(assignment_id)
            .exec(&self.database)
            .await?;
        ensure_deleted(&deleted, "Assignment")?;

        tracing::info!(assignment_id, "assignment deleted");
        Ok(assignment)
    }

    async fn assignment_by_id(&self, assignment_id: i32) -> ResultEngine<Assignment> {
        let sql = format!("{ASSIGNMENT_LISTING} WHERE ta.id = ?");
        self.fetch_assignments(&self.database, sql, vec![assignment_id.into()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::NotFound("Assignment".to_string()))
    }

    async fn fetch_assignments<C: ConnectionTrait>(
        &self,
        db: &C,
        sql: String,
        values: Vec<Value>,
    ) -> ResultEngine<Vec<Assignment>> {
        let stmt = Statement::from_sql_and_values(db.get_database_backend(), sql, values);
        Ok(Assignment::find_by_statement(stmt).all(db).await?)
    }
}
