use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{ResultEngine, Role, Teacher, UserProfile, users};

use super::{Engine, ensure_deleted};

impl Engine {
    /// Users holding the teacher role, ordered by full name.
    pub async fn list_teachers(&self) -> ResultEngine<Vec<Teacher>> {
        let models = users::Entity::find()
            .filter(users::Column::Role.eq(Role::Teacher.as_str()))
            .order_by_asc(users::Column::FullName)
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Teacher::from).collect())
    }

    pub async fn create_teacher(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> ResultEngine<UserProfile> {
        let teacher = self
            .create_user(username, password, full_name, Role::Teacher)
            .await?;
        tracing::info!(teacher_id = teacher.id, "teacher created");
        Ok(teacher)
    }

    /// Deletes a teacher account. Admin accounts are not reachable through
    /// this call and report `NotFound`.
    pub async fn delete_teacher(&self, teacher_id: i32) -> ResultEngine<Teacher> {
        let model = self.require_teacher(&self.database, teacher_id).await?;
        let deleted = users::Entity::delete_by_id(teacher_id)
            .exec(&self.database)
            .await?;
        ensure_deleted(&deleted, "Teacher")?;

        tracing::info!(teacher_id, "teacher deleted");
        Ok(Teacher::from(model))
    }
}
