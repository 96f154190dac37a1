//! Attendance sessions.
//!
//! A session is one teacher's submission for a class, subject and date. The
//! `(teacher_id, class_id, subject_id, session_date)` tuple is unique in the
//! schema; that index decides between concurrent submissions.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{AttendanceStatus, EngineError, ResultEngine};

/// One student's status in a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub student_id: i32,
    pub status: AttendanceStatus,
}

/// Input of [`Engine::submit_attendance`](crate::Engine::submit_attendance).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAttendance {
    pub class_id: i32,
    pub subject_id: i32,
    pub date: NaiveDate,
    pub lecture_start: Option<NaiveTime>,
    pub lecture_end: Option<NaiveTime>,
    pub entries: Vec<AttendanceEntry>,
}

impl NewAttendance {
    /// Checks the submission shape before any storage access.
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.entries.is_empty() {
            return Err(EngineError::Validation(
                "attendance data must be a non-empty list".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.lecture_start, self.lecture_end)
            && end < start
        {
            return Err(EngineError::Validation(
                "lecture end time is before its start time".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(entry.student_id) {
                return Err(EngineError::Validation(format!(
                    "student {} is listed more than once",
                    entry.student_id
                )));
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub teacher_id: i32,
    pub class_id: i32,
    pub subject_id: i32,
    pub session_date: NaiveDate,
    pub lecture_start_time: Option<NaiveTime>,
    pub lecture_end_time: Option<NaiveTime>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Teacher,
    #[sea_orm(has_many = "super::attendance_records::Entity")]
    Records,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::attendance_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
