use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, prelude::*};

use crate::{Class, EngineError, ResultEngine, classes};

use super::{Engine, ensure_deleted, normalize_required, on_unique};

impl Engine {
    /// All classes ordered by name.
    pub async fn list_classes(&self) -> ResultEngine<Vec<Class>> {
        let models = classes::Entity::find()
            .order_by_asc(classes::Column::ClassName)
            .order_by_asc(classes::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Class::from).collect())
    }

    pub async fn create_class(&self, name: &str, code: &str) -> ResultEngine<Class> {
        let name = normalize_required(name, "class name")?;
        let code = normalize_required(code, "class code")?;

        let active = classes::ActiveModel {
            class_name: ActiveValue::Set(name),
            class_code: ActiveValue::Set(code),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let model = active
            .insert(&self.database)
            .await
            .map_err(|err| on_unique(err, || EngineError::DuplicateKey("Class code".to_string())))?;

        tracing::info!(class_id = model.id, "class created");
        Ok(Class::from(model))
    }

    /// Deletes a class together with its students, assignments and sessions.
    pub async fn delete_class(&self, class_id: i32) -> ResultEngine<Class> {
        let model = self.require_class(&self.database, class_id).await?;
        let deleted = classes::Entity::delete_by_id(class_id)
            .exec(&self.database)
            .await?;
        ensure_deleted(&deleted, "Class")?;

        tracing::info!(class_id, "class deleted");
        Ok(Class::from(model))
    }
}
