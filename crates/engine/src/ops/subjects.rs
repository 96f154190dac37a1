use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, prelude::*};

use crate::{EngineError, ResultEngine, Subject, subjects};

use super::{Engine, ensure_deleted, normalize_required, on_unique};

impl Engine {
    pub async fn list_subjects(&self) -> ResultEngine<Vec<Subject>> {
        let models = subjects::Entity::find()
            .order_by_asc(subjects::Column::SubjectName)
            .order_by_asc(subjects::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Subject::from).collect())
    }

    pub async fn create_subject(&self, name: &str, code: &str) -> ResultEngine<Subject> {
        let name = normalize_required(name, "subject name")?;
        let code = normalize_required(code, "subject code")?;

        let active = subjects::ActiveModel {
            subject_name: ActiveValue::Set(name),
            subject_code: ActiveValue::Set(code),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let model = active.insert(&self.database).await.map_err(|err| {
            on_unique(err, || EngineError::DuplicateKey("Subject code".to_string()))
        })?;

        tracing::info!(subject_id = model.id, "subject created");
        Ok(Subject::from(model))
    }

    /// Deletes a subject; assignments and sessions referencing it go with it.
    pub async fn delete_subject(&self, subject_id: i32) -> ResultEngine<Subject> {
        let model = self.require_subject(&self.database, subject_id).await?;
        let deleted = subjects::Entity::delete_by_id(subject_id)
            .exec(&self.database)
            .await?;
        ensure_deleted(&deleted, "Subject")?;

        tracing::info!(subject_id, "subject deleted");
        Ok(Subject::from(model))
    }
}
