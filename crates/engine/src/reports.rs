//! Read-only reporting types: filters and the rows the aggregation queries
//! produce.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::FromQueryResult;

use crate::AttendanceStatus;

/// Admin session listing filter. Every field narrows the result when set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub class_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub date: Option<NaiveDate>,
}

/// Per-student statistics filter. Date bounds are inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsFilter {
    pub class_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Teacher history filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub class_id: Option<i32>,
    pub subject_id: Option<i32>,
}

/// One student's line inside a session report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordEntry {
    pub student_id: i32,
    pub student_name: String,
    pub student_number: String,
    pub status: AttendanceStatus,
}

/// A session with its records nested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecords {
    pub session_id: i32,
    pub session_date: NaiveDate,
    pub lecture_start_time: Option<NaiveTime>,
    pub lecture_end_time: Option<NaiveTime>,
    pub teacher_name: String,
    pub class_name: String,
    pub subject_name: String,
    pub submitted_at: DateTime<Utc>,
    pub records: Vec<RecordEntry>,
}

/// Session header as read from the database, before records are attached.
#[derive(Debug, FromQueryResult)]
pub(crate) struct SessionHeaderRow {
    pub session_id: i32,
    pub session_date: NaiveDate,
    pub lecture_start_time: Option<NaiveTime>,
    pub lecture_end_time: Option<NaiveTime>,
    pub teacher_name: String,
    pub class_name: String,
    pub subject_name: String,
    pub submitted_at: DateTime<Utc>,
}

impl SessionHeaderRow {
    pub(crate) fn with_records(self, records: Vec<RecordEntry>) -> SessionRecords {
        SessionRecords {
            session_id: self.session_id,
            session_date: self.session_date,
            lecture_start_time: self.lecture_start_time,
            lecture_end_time: self.lecture_end_time,
            teacher_name: self.teacher_name,
            class_name: self.class_name,
            subject_name: self.subject_name,
            submitted_at: self.submitted_at,
            records,
        }
    }
}

/// Aggregate counts for one session of a teacher's history.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct SessionSummary {
    pub session_id: i32,
    pub session_date: NaiveDate,
    pub lecture_start_time: Option<NaiveTime>,
    pub lecture_end_time: Option<NaiveTime>,
    pub class_name: String,
    pub subject_name: String,
    pub submitted_at: DateTime<Utc>,
    pub total_students: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub excused_count: i64,
}

/// Aggregate counts for one student across the sessions matching a filter.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct StudentStats {
    pub student_id: i32,
    pub student_name: String,
    pub student_number: String,
    pub class_name: String,
    pub total_records: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub excused_count: i64,
}

impl StudentStats {
    /// Share of `present` records as a percentage, `0.0` without records.
    pub fn attendance_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        self.present_count as f64 * 100.0 / self.total_records as f64
    }
}
