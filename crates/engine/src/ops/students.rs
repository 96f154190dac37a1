use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, FromQueryResult, QueryFilter, Statement, Value, prelude::*,
};

use crate::{EngineError, ResultEngine, Student, students};

use super::{Engine, ensure_deleted, normalize_required, on_unique};

const STUDENT_LISTING: &str = "SELECT s.id, s.student_name, s.student_number, s.class_id, \
     c.class_name, c.class_code, s.created_at \
     FROM students s JOIN classes c ON c.id = s.class_id";

impl Engine {
    /// Students joined with their class, ordered by class name then student
    /// name. `class_id` restricts the listing to one class.
    pub async fn list_students(&self, class_id: Option<i32>) -> ResultEngine<Vec<Student>> {
        let mut sql = STUDENT_LISTING.to_string();
        let mut values: Vec<Value> = Vec::new();
        if let Some(class_id) = class_id {
            sql.push_str(" WHERE s.class_id = ?");
            values.push(class_id.into());
        }
        sql.push_str(" ORDER BY c.class_name, s.student_name, s.id");

        let stmt =
            Statement::from_sql_and_values(self.database.get_database_backend(), sql, values);
        Ok(Student::find_by_statement(stmt)
            .all(&self.database)
            .await?)
    }

    pub async fn create_student(
        &self,
        name: &str,
        student_number: &str,
        class_id: i32,
    ) -> ResultEngine<Student> {
        let name = normalize_required(name, "student name")?;
        let student_number = normalize_required(student_number, "student ID")?;
        let class = self.require_class(&self.database, class_id).await?;

        let active = students::ActiveModel {
            student_name: ActiveValue::Set(name),
            student_number: ActiveValue::Set(student_number),
            class_id: ActiveValue::Set(class_id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let model = active.insert(&self.database).await.map_err(|err| {
            on_unique(err, || EngineError::DuplicateKey("Student ID".to_string()))
        })?;

        tracing::info!(student_id = model.id, class_id, "student created");
        Ok(Student {
            class_name: Some(class.class_name),
            class_code: Some(class.class_code),
            ..Student::from(model)
        })
    }

    /// Deletes a student and every attendance record they hold.
    pub async fn delete_student(&self, student_id: i32) -> ResultEngine<Student> {
        let model = students::Entity::find_by_id(student_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("Student".to_string()))?;
        let deleted = students::Entity::delete_by_id(student_id)
            .exec(&self.database)
            .await?;
        ensure_deleted(&deleted, "Student")?;

        tracing::info!(student_id, "student deleted");
        Ok(Student::from(model))
    }

    /// Ids of `student_ids` that are not enrolled in `class_id`, in input order.
    pub(super) async fn students_outside_class<C: ConnectionTrait>(
        &self,
        db: &C,
        class_id: i32,
        student_ids: &[i32],
    ) -> ResultEngine<Vec<i32>> {
        let enrolled: Vec<i32> = students::Entity::find()
            .filter(students::Column::ClassId.eq(class_id))
            .filter(students::Column::Id.is_in(student_ids.iter().copied()))
            .all(db)
            .await?
            .into_iter()
            .map(|model| model.id)
            .collect();

        Ok(student_ids
            .iter()
            .copied()
            .filter(|id| !enrolled.contains(id))
            .collect())
    }
}
