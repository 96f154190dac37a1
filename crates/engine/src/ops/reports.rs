use std::collections::HashMap;

use sea_orm::{FromQueryResult, Statement, Value, prelude::*};

use crate::{
    AttendanceFilter, AttendanceStatus, RecordEntry, ResultEngine, SessionRecords, StatsFilter,
    StudentStats, reports::SessionHeaderRow,
};

use super::Engine;

/// How many sessions the admin listing returns at most.
const RECORDS_LIMIT: u32 = 100;

#[derive(Debug, FromQueryResult)]
struct RecordRow {
    session_id: i32,
    student_id: i32,
    student_name: String,
    student_number: String,
    status: String,
}

impl Engine {
    /// Sessions matching `filter`, newest first, each with its records nested.
    pub async fn attendance_records(
        &self,
        filter: AttendanceFilter,
    ) -> ResultEngine<Vec<SessionRecords>> {
        let backend = self.database.get_database_backend();

        let mut sql = String::from(
            "SELECT ats.id AS session_id, ats.session_date, ats.lecture_start_time, \
             ats.lecture_end_time, u.full_name AS teacher_name, c.class_name, s.subject_name, \
             ats.submitted_at \
             FROM attendance_sessions ats \
             JOIN users u ON u.id = ats.teacher_id \
             JOIN classes c ON c.id = ats.class_id \
             JOIN subjects s ON s.id = ats.subject_id \
             WHERE 1 = 1",
        );
        let mut values: Vec<Value> = Vec::new();
        if let Some(class_id) = filter.class_id {
            sql.push_str(" AND ats.class_id = ?");
            values.push(class_id.into());
        }
        if let Some(subject_id) = filter.subject_id {
            sql.push_str(" AND ats.subject_id = ?");
            values.push(subject_id.into());
        }
        if let Some(date) = filter.date {
            sql.push_str(" AND ats.session_date = ?");
            values.push(date.into());
        }
        sql.push_str(" ORDER BY ats.session_date DESC, ats.submitted_at DESC, ats.id DESC LIMIT ?");
        values.push(RECORDS_LIMIT.into());

        let headers = SessionHeaderRow::find_by_statement(Statement::from_sql_and_values(
            backend, sql, values,
        ))
        .all(&self.database)
        .await?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; headers.len()].join(", ");
        let sql = format!(
            "SELECT ar.session_id, ar.student_id, st.student_name, st.student_number, ar.status \
             FROM attendance_records ar \
             JOIN students st ON st.id = ar.student_id \
             WHERE ar.session_id IN ({placeholders}) \
             ORDER BY st.student_name, st.id"
        );
        let ids: Vec<Value> = headers.iter().map(|h| h.session_id.into()).collect();
        let rows = RecordRow::find_by_statement(Statement::from_sql_and_values(backend, sql, ids))
            .all(&self.database)
            .await?;

        let mut grouped: HashMap<i32, Vec<RecordEntry>> = HashMap::new();
        for row in rows {
            let status = AttendanceStatus::try_from(row.status.as_str())?;
            grouped.entry(row.session_id).or_default().push(RecordEntry {
                student_id: row.student_id,
                student_name: row.student_name,
                student_number: row.student_number,
                status,
            });
        }

        Ok(headers
            .into_iter()
            .map(|header| {
                let records = grouped.remove(&header.session_id).unwrap_or_default();
                header.with_records(records)
            })
            .collect())
    }

    /// Per-student counts across the sessions matching `filter`.
    ///
    /// Every student of the selected classes is listed, with zero counts when
    /// no session matches.
    pub async fn student_attendance_stats(
        &self,
        filter: StatsFilter,
    ) -> ResultEngine<Vec<StudentStats>> {
        let mut matching = String::from(
            "SELECT ar.id, ar.student_id, ar.status \
             FROM attendance_records ar \
             JOIN attendance_sessions ats ON ats.id = ar.session_id \
             WHERE 1 = 1",
        );
        let mut values: Vec<Value> = Vec::new();
        if let Some(subject_id) = filter.subject_id {
            matching.push_str(" AND ats.subject_id = ?");
            values.push(subject_id.into());
        }
        if let Some(start) = filter.start_date {
            matching.push_str(" AND ats.session_date >= ?");
            values.push(start.into());
        }
        if let Some(end) = filter.end_date {
            matching.push_str(" AND ats.session_date <= ?");
            values.push(end.into());
        }

        let mut sql = format!(
            "SELECT st.id AS student_id, st.student_name, st.student_number, c.class_name, \
             COUNT(f.id) AS total_records, \
             COALESCE(SUM(CASE WHEN f.status = 'present' THEN 1 ELSE 0 END), 0) AS present_count, \
             COALESCE(SUM(CASE WHEN f.status = 'absent' THEN 1 ELSE 0 END), 0) AS absent_count, \
             COALESCE(SUM(CASE WHEN f.status = 'excused' THEN 1 ELSE 0 END), 0) AS excused_count \
             FROM students st \
             JOIN classes c ON c.id = st.class_id \
             LEFT JOIN ({matching}) f ON f.student_id = st.id \
             WHERE 1 = 1"
        );
        if let Some(class_id) = filter.class_id {
            sql.push_str(" AND st.class_id = ?");
            values.push(class_id.into());
        }
        sql.push_str(
            " GROUP BY st.id, st.student_name, st.student_number, c.class_name \
             ORDER BY c.class_name, st.student_name, st.id",
        );

        let stmt =
            Statement::from_sql_and_values(self.database.get_database_backend(), sql, values);
        Ok(StudentStats::find_by_statement(stmt)
            .all(&self.database)
            .await?)
    }
}
