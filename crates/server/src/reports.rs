//! Admin attendance reports

use api_types::attendance::{RecordsQuery, SessionRecords, StatsQuery, StudentStats};
use axum::{
    Json,
    extract::State,
};
use engine::{AttendanceFilter, StatsFilter};

use crate::{ServerError, convert, extract::QueryParams, server::ServerState};

/// Newest sessions first, each with its per-student records.
pub async fn records(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<RecordsQuery>,
) -> Result<Json<Vec<SessionRecords>>, ServerError> {
    let filter = AttendanceFilter {
        class_id: query.class_id,
        subject_id: query.subject_id,
        date: query.date,
    };
    let sessions = state.engine.attendance_records(filter).await?;
    Ok(Json(
        sessions.into_iter().map(convert::session_records).collect(),
    ))
}

pub async fn student_stats(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<StatsQuery>,
) -> Result<Json<Vec<StudentStats>>, ServerError> {
    let filter = StatsFilter {
        class_id: query.class_id,
        subject_id: query.subject_id,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let stats = state.engine.student_attendance_stats(filter).await?;
    Ok(Json(stats.into_iter().map(convert::student_stats).collect()))
}
