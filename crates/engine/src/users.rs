//! Users table and the identity types derived from it.
//!
//! A user is either an administrator or a teacher. The role is stored as a
//! lowercase string and parsed into [`Role`] at the boundary.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Closed set of roles a user can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            other => Err(EngineError::Validation(format!("invalid role: {other}"))),
        }
    }
}

/// The caller of an operation, as resolved from a verified token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub role: Role,
}

impl Identity {
    /// Whether the caller may act on the account `user_id`.
    pub fn can_manage(&self, user_id: i32) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Teacher => self.user_id == user_id,
        }
    }
}

/// Public profile returned on login and account creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

/// Full account view, timestamps included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDetail {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user with the teacher role, as listed to administrators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Teacher {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::teacher_assignments::Entity")]
    Assignments,
    #[sea_orm(has_many = "super::attendance_sessions::Entity")]
    Sessions,
}

impl Related<super::teacher_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::attendance_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for UserProfile {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            role: Role::try_from(model.role.as_str())?,
            username: model.username,
            full_name: model.full_name,
        })
    }
}

impl TryFrom<Model> for UserDetail {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            role: Role::try_from(model.role.as_str())?,
            username: model.username,
            full_name: model.full_name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<Model> for Teacher {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            full_name: model.full_name,
            created_at: model.created_at,
        }
    }
}
