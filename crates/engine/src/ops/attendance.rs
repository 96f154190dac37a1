use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, FromQueryResult, QueryFilter, QueryOrder, Statement,
    TransactionTrait, Value, prelude::*,
};

use crate::{
    Assignment, EngineError, HistoryFilter, NewAttendance, ResultEngine, SessionSummary, Student,
    attendance_records, attendance_sessions, students,
};

use super::{Engine, is_foreign_key_violation, is_unique_violation, lock_for_write, with_tx};

/// How many sessions a teacher's history returns at most.
const HISTORY_LIMIT: u32 = 50;

impl Engine {
    /// The (class, subject) pairs the teacher may record attendance for.
    pub async fn teacher_assignments(&self, teacher_id: i32) -> ResultEngine<Vec<Assignment>> {
        self.list_assignments(Some(teacher_id)).await
    }

    /// The roster of `class_id`, ordered by name. The subject only gates the
    /// permission check.
    pub async fn students_for_attendance(
        &self,
        teacher_id: i32,
        class_id: i32,
        subject_id: i32,
    ) -> ResultEngine<Vec<Student>> {
        self.require_assignment(&self.database, teacher_id, class_id, subject_id)
            .await?;

        let models = students::Entity::find()
            .filter(students::Column::ClassId.eq(class_id))
            .order_by_asc(students::Column::StudentName)
            .order_by_asc(students::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Student::from).collect())
    }

    /// Records one session and its per-student statuses atomically.
    ///
    /// Checked in order: assignment, no existing session for the date, then
    /// class membership of every listed student. Any failure writes nothing.
    /// The transaction takes the write lock first, so concurrent identical
    /// submissions run one after the other and the later one sees the
    /// earlier session. The unique index over (teacher, class, subject, date)
    /// backs that up; the loser gets `DuplicateSession` either way.
    pub async fn submit_attendance(
        &self,
        teacher_id: i32,
        submission: &NewAttendance,
    ) -> ResultEngine<i32> {
        submission.validate()?;

        match self.submit_in_tx(teacher_id, submission).await {
            Err(EngineError::Database(err)) => {
                // A writer that outlived the busy timeout may still have
                // committed the same session; wait for the lock to find out.
                let committed = with_tx!(self, |db_tx| {
                    lock_for_write(&db_tx).await?;
                    self.session_exists(
                        &db_tx,
                        teacher_id,
                        submission.class_id,
                        submission.subject_id,
                        submission.date,
                    )
                    .await
                })?;
                if committed {
                    return Err(EngineError::DuplicateSession);
                }
                Err(EngineError::Database(err))
            }
            other => other,
        }
    }

    async fn submit_in_tx(&self, teacher_id: i32, submission: &NewAttendance) -> ResultEngine<i32> {
        let session_id = with_tx!(self, |db_tx| {
            lock_for_write(&db_tx).await?;

            self.require_assignment(&db_tx, teacher_id, submission.class_id, submission.subject_id)
                .await?;

            if self
                .session_exists(
                    &db_tx,
                    teacher_id,
                    submission.class_id,
                    submission.subject_id,
                    submission.date,
                )
                .await?
            {
                return Err(EngineError::DuplicateSession);
            }

            let session = attendance_sessions::ActiveModel {
                teacher_id: ActiveValue::Set(teacher_id),
                class_id: ActiveValue::Set(submission.class_id),
                subject_id: ActiveValue::Set(submission.subject_id),
                session_date: ActiveValue::Set(submission.date),
                lecture_start_time: ActiveValue::Set(submission.lecture_start),
                lecture_end_time: ActiveValue::Set(submission.lecture_end),
                submitted_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let session = session.insert(&db_tx).await.map_err(|err| {
                if is_unique_violation(&err) {
                    EngineError::DuplicateSession
                } else {
                    EngineError::Database(err)
                }
            })?;

            let student_ids: Vec<i32> = submission
                .entries
                .iter()
                .map(|entry| entry.student_id)
                .collect();
            if let Some(outsider) = self
                .students_outside_class(&db_tx, submission.class_id, &student_ids)
                .await?
                .first()
            {
                return Err(EngineError::StudentNotInClass(*outsider));
            }

            let records = submission
                .entries
                .iter()
                .map(|entry| attendance_records::ActiveModel {
                    session_id: ActiveValue::Set(session.id),
                    student_id: ActiveValue::Set(entry.student_id),
                    status: ActiveValue::Set(entry.status.as_str().to_string()),
                    ..Default::default()
                });
            attendance_records::Entity::insert_many(records)
                .exec(&db_tx)
                .await
                .map_err(|err| {
                    if is_foreign_key_violation(&err) {
                        EngineError::NotFound("Student".to_string())
                    } else {
                        EngineError::Database(err)
                    }
                })?;

            Ok(session.id)
        })?;

        tracing::info!(
            session_id,
            teacher_id,
            class_id = submission.class_id,
            subject_id = submission.subject_id,
            records = submission.entries.len(),
            "attendance submitted"
        );
        Ok(session_id)
    }

    /// The teacher's most recent sessions with per-status counts.
    pub async fn attendance_history(
        &self,
        teacher_id: i32,
        filter: HistoryFilter,
    ) -> ResultEngine<Vec<SessionSummary>> {
        let mut sql = String::from(
            "SELECT ats.id AS session_id, ats.session_date, ats.lecture_start_time, \
             ats.lecture_end_time, c.class_name, s.subject_name, ats.submitted_at, \
             COUNT(ar.id) AS total_students, \
             COALESCE(SUM(CASE WHEN ar.status = 'present' THEN 1 ELSE 0 END), 0) AS present_count, \
             COALESCE(SUM(CASE WHEN ar.status = 'absent' THEN 1 ELSE 0 END), 0) AS absent_count, \
             COALESCE(SUM(CASE WHEN ar.status = 'excused' THEN 1 ELSE 0 END), 0) AS excused_count \
             FROM attendance_sessions ats \
             JOIN classes c ON c.id = ats.class_id \
             JOIN subjects s ON s.id = ats.subject_id \
             LEFT JOIN attendance_records ar ON ar.session_id = ats.id \
             WHERE ats.teacher_id = ?",
        );
        let mut values: Vec<Value> = vec![teacher_id.into()];
        if let Some(class_id) = filter.class_id {
            sql.push_str(" AND ats.class_id = ?");
            values.push(class_id.into());
        }
        if let Some(subject_id) = filter.subject_id {
            sql.push_str(" AND ats.subject_id = ?");
            values.push(subject_id.into());
        }
        sql.push_str(
            " GROUP BY ats.id, ats.session_date, ats.lecture_start_time, ats.lecture_end_time, \
             c.class_name, s.subject_name, ats.submitted_at \
             ORDER BY ats.session_date DESC, ats.submitted_at DESC, ats.id DESC LIMIT ?",
        );
        values.push(HISTORY_LIMIT.into());

        let stmt =
            Statement::from_sql_and_values(self.database.get_database_backend(), sql, values);
        Ok(SessionSummary::find_by_statement(stmt)
            .all(&self.database)
            .await?)
    }

    async fn session_exists<C: ConnectionTrait>(
        &self,
        db: &C,
        teacher_id: i32,
        class_id: i32,
        subject_id: i32,
        date: NaiveDate,
    ) -> ResultEngine<bool> {
        Ok(attendance_sessions::Entity::find()
            .filter(attendance_sessions::Column::TeacherId.eq(teacher_id))
            .filter(attendance_sessions::Column::ClassId.eq(class_id))
            .filter(attendance_sessions::Column::SubjectId.eq(subject_id))
            .filter(attendance_sessions::Column::SessionDate.eq(date))
            .one(db)
            .await?
            .is_some())
    }
}
