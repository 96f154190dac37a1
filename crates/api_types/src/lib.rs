//! Wire types of the attendance HTTP API. JSON fields are camelCase.
//!
//! Request bodies keep required fields optional so the server can answer a
//! missing field with a `400` and a readable message instead of a decoder
//! rejection.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Excused,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Excused => "excused",
        }
    }
}

/// Body of every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Plain confirmation, as returned by deletions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

pub mod auth {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: Option<String>,
        pub password: Option<String>,
    }

    /// Public profile of an account.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserProfile {
        pub id: i32,
        pub username: String,
        pub full_name: String,
        pub role: Role,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LoginResponse {
        /// Bearer token valid for 24 hours.
        pub token: String,
        pub user: UserProfile,
    }

    /// Identity carried by the caller's token.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Profile {
        pub user_id: i32,
        pub role: Role,
    }
}

pub mod class {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClassNew {
        pub class_name: Option<String>,
        pub class_code: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Class {
        pub id: i32,
        pub class_name: String,
        pub class_code: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod subject {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubjectNew {
        pub subject_name: Option<String>,
        pub subject_code: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Subject {
        pub id: i32,
        pub subject_name: String,
        pub subject_code: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod student {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StudentNew {
        pub student_name: Option<String>,
        /// School issued identifier, unique across students.
        pub student_id: Option<String>,
        pub class_id: Option<i32>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StudentQuery {
        pub class_id: Option<i32>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Student {
        pub id: i32,
        pub student_name: String,
        pub student_id: String,
        pub class_id: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub class_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub class_code: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod teacher {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TeacherNew {
        pub username: Option<String>,
        pub password: Option<String>,
        pub full_name: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Teacher {
        pub id: i32,
        pub username: String,
        pub full_name: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod assignment {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AssignmentNew {
        pub teacher_id: Option<i32>,
        pub class_id: Option<i32>,
        pub subject_id: Option<i32>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AssignmentQuery {
        pub teacher_id: Option<i32>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Assignment {
        pub id: i32,
        pub teacher_id: i32,
        pub class_id: i32,
        pub subject_id: i32,
        pub teacher_name: String,
        pub class_name: String,
        pub class_code: String,
        pub subject_name: String,
        pub subject_code: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod attendance {
    use super::*;

    /// One student's line of a submission. `status` is parsed by the server.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AttendanceEntry {
        pub student_id: i32,
        pub status: String,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AttendanceSubmit {
        pub class_id: Option<i32>,
        pub subject_id: Option<i32>,
        /// `YYYY-MM-DD`.
        pub date: Option<String>,
        pub attendance: Option<Vec<AttendanceEntry>>,
        /// `HH:MM` or `HH:MM:SS`.
        pub lecture_start_time: Option<String>,
        pub lecture_end_time: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AttendanceSubmitted {
        pub session_id: i32,
        pub message: String,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RosterQuery {
        pub class_id: Option<i32>,
        pub subject_id: Option<i32>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HistoryQuery {
        pub class_id: Option<i32>,
        pub subject_id: Option<i32>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordsQuery {
        pub class_id: Option<i32>,
        pub subject_id: Option<i32>,
        pub date: Option<NaiveDate>,
    }

    /// Date bounds are inclusive.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StatsQuery {
        pub class_id: Option<i32>,
        pub subject_id: Option<i32>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
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

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordEntry {
        pub student_id: i32,
        pub student_name: String,
        pub student_number: String,
        pub status: AttendanceStatus,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
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

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StudentStats {
        pub student_id: i32,
        pub student_name: String,
        pub student_number: String,
        pub class_name: String,
        pub total_records: i64,
        pub present_count: i64,
        pub absent_count: i64,
        pub excused_count: i64,
        /// Percentage of present records, `0.0` without records.
        pub attendance_rate: f64,
    }
}

pub mod user {
    use super::*;
    use crate::auth::UserProfile;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserDetail {
        pub id: i32,
        pub username: String,
        pub full_name: String,
        pub role: Role,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CredentialsUpdate {
        pub username: Option<String>,
        pub password: Option<String>,
        /// Required when changing one's own account.
        pub current_password: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CredentialsUpdated {
        pub message: String,
        pub user: UserProfile,
    }
}
