//! Teacher endpoints: own assignments, class roster, submission and history

use api_types::{
    assignment::Assignment,
    attendance::{
        AttendanceSubmit, AttendanceSubmitted, HistoryQuery, RosterQuery, SessionSummary,
    },
    student::Student,
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use chrono::{NaiveDate, NaiveTime};
use engine::{AttendanceEntry, AttendanceStatus, HistoryFilter, Identity, NewAttendance};

use crate::{ServerError, convert, extract::{JsonBody, QueryParams}, present, server::ServerState};

pub async fn assignments(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Assignment>>, ServerError> {
    let assignments = state.engine.teacher_assignments(identity.user_id).await?;
    Ok(Json(assignments.into_iter().map(convert::assignment).collect()))
}

/// Students of a class the caller teaches. `subjectId` is needed for the
/// assignment check.
pub async fn roster(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<RosterQuery>,
) -> Result<Json<Vec<Student>>, ServerError> {
    let (Some(class_id), Some(subject_id)) = (query.class_id, query.subject_id) else {
        return Err(ServerError::Generic(
            "Class ID and Subject ID are required".to_string(),
        ));
    };

    let students = state
        .engine
        .students_for_attendance(identity.user_id, class_id, subject_id)
        .await?;
    Ok(Json(students.into_iter().map(convert::student).collect()))
}

/// Handle requests for submitting one attendance session
pub async fn submit(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<AttendanceSubmit>,
) -> Result<(StatusCode, Json<AttendanceSubmitted>), ServerError> {
    let submission = parse_submission(payload)?;
    let session_id = state
        .engine
        .submit_attendance(identity.user_id, &submission)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AttendanceSubmitted {
            session_id,
            message: "Attendance submitted successfully".to_string(),
        }),
    ))
}

pub async fn history(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<HistoryQuery>,
) -> Result<Json<Vec<SessionSummary>>, ServerError> {
    let filter = HistoryFilter {
        class_id: query.class_id,
        subject_id: query.subject_id,
    };
    let history = state
        .engine
        .attendance_history(identity.user_id, filter)
        .await?;
    Ok(Json(
        history.into_iter().map(convert::session_summary).collect(),
    ))
}

fn parse_submission(payload: AttendanceSubmit) -> Result<NewAttendance, ServerError> {
    let (Some(class_id), Some(subject_id), Some(date), Some(attendance)) = (
        payload.class_id,
        payload.subject_id,
        present(&payload.date),
        payload.attendance.as_ref(),
    ) else {
        return Err(ServerError::Generic("All fields are required".to_string()));
    };
    if attendance.is_empty() {
        return Err(ServerError::Generic(
            "Attendance data must be a non-empty array".to_string(),
        ));
    }

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ServerError::Generic(format!("Invalid date '{date}', expected YYYY-MM-DD")))?;
    let lecture_start = parse_lecture_time(&payload.lecture_start_time)?;
    let lecture_end = parse_lecture_time(&payload.lecture_end_time)?;

    let entries = attendance
        .iter()
        .map(|entry| -> Result<AttendanceEntry, ServerError> {
            Ok(AttendanceEntry {
                student_id: entry.student_id,
                status: AttendanceStatus::try_from(entry.status.as_str())?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewAttendance {
        class_id,
        subject_id,
        date,
        lecture_start,
        lecture_end,
        entries,
    })
}

/// Accepts `HH:MM` and `HH:MM:SS`; blank means not given.
fn parse_lecture_time(value: &Option<String>) -> Result<Option<NaiveTime>, ServerError> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map(Some)
        .map_err(|_| ServerError::Generic(format!("Invalid lecture time '{value}'")))
}
