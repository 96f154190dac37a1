//! Students. Each student belongs to exactly one class and carries a school
//! issued `student_number` that is distinct from the row id.

use chrono::{DateTime, Utc};
use sea_orm::{FromQueryResult, entity::prelude::*};

/// A student, optionally joined with its class for listings that span classes.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct Student {
    pub id: i32,
    pub student_name: String,
    pub student_number: String,
    pub class_id: i32,
    pub class_name: Option<String>,
    pub class_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_name: String,
    #[sea_orm(unique)]
    pub student_number: String,
    pub class_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Class,
    #[sea_orm(has_many = "super::attendance_records::Entity")]
    Records,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::attendance_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Student {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            student_name: model.student_name,
            student_number: model.student_number,
            class_id: model.class_id,
            class_name: None,
            class_code: None,
            created_at: model.created_at,
        }
    }
}
