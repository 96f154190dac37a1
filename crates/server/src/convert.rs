//! Engine types to wire types.

use api_types::{
    assignment::Assignment,
    attendance::{RecordEntry, SessionRecords, SessionSummary, StudentStats},
    auth::UserProfile,
    class::Class,
    student::Student,
    subject::Subject,
    teacher::Teacher,
    user::UserDetail,
};

pub(crate) fn role(role: engine::Role) -> api_types::Role {
    match role {
        engine::Role::Admin => api_types::Role::Admin,
        engine::Role::Teacher => api_types::Role::Teacher,
    }
}

pub(crate) fn status(status: engine::AttendanceStatus) -> api_types::AttendanceStatus {
    match status {
        engine::AttendanceStatus::Present => api_types::AttendanceStatus::Present,
        engine::AttendanceStatus::Absent => api_types::AttendanceStatus::Absent,
        engine::AttendanceStatus::Excused => api_types::AttendanceStatus::Excused,
    }
}

pub(crate) fn profile(user: engine::UserProfile) -> UserProfile {
    UserProfile {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        role: role(user.role),
    }
}

pub(crate) fn user_detail(user: engine::UserDetail) -> UserDetail {
    UserDetail {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        role: role(user.role),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub(crate) fn teacher(teacher: engine::Teacher) -> Teacher {
    Teacher {
        id: teacher.id,
        username: teacher.username,
        full_name: teacher.full_name,
        created_at: teacher.created_at,
    }
}

pub(crate) fn class(class: engine::Class) -> Class {
    Class {
        id: class.id,
        class_name: class.name,
        class_code: class.code,
        created_at: class.created_at,
    }
}

pub(crate) fn subject(subject: engine::Subject) -> Subject {
    Subject {
        id: subject.id,
        subject_name: subject.name,
        subject_code: subject.code,
        created_at: subject.created_at,
    }
}

pub(crate) fn student(student: engine::Student) -> Student {
    Student {
        id: student.id,
        student_name: student.student_name,
        student_id: student.student_number,
        class_id: student.class_id,
        class_name: student.class_name,
        class_code: student.class_code,
        created_at: student.created_at,
    }
}

pub(crate) fn assignment(assignment: engine::Assignment) -> Assignment {
    Assignment {
        id: assignment.id,
        teacher_id: assignment.teacher_id,
        class_id: assignment.class_id,
        subject_id: assignment.subject_id,
        teacher_name: assignment.teacher_name,
        class_name: assignment.class_name,
        class_code: assignment.class_code,
        subject_name: assignment.subject_name,
        subject_code: assignment.subject_code,
        created_at: assignment.created_at,
    }
}

pub(crate) fn session_summary(summary: engine::SessionSummary) -> SessionSummary {
    SessionSummary {
        session_id: summary.session_id,
        session_date: summary.session_date,
        lecture_start_time: summary.lecture_start_time,
        lecture_end_time: summary.lecture_end_time,
        class_name: summary.class_name,
        subject_name: summary.subject_name,
        submitted_at: summary.submitted_at,
        total_students: summary.total_students,
        present_count: summary.present_count,
        absent_count: summary.absent_count,
        excused_count: summary.excused_count,
    }
}

pub(crate) fn session_records(session: engine::SessionRecords) -> SessionRecords {
    SessionRecords {
        session_id: session.session_id,
        session_date: session.session_date,
        lecture_start_time: session.lecture_start_time,
        lecture_end_time: session.lecture_end_time,
        teacher_name: session.teacher_name,
        class_name: session.class_name,
        subject_name: session.subject_name,
        submitted_at: session.submitted_at,
        records: session
            .records
            .into_iter()
            .map(|record| RecordEntry {
                student_id: record.student_id,
                student_name: record.student_name,
                student_number: record.student_number,
                status: status(record.status),
            })
            .collect(),
    }
}

pub(crate) fn student_stats(stats: engine::StudentStats) -> StudentStats {
    StudentStats {
        attendance_rate: stats.attendance_rate(),
        student_id: stats.student_id,
        student_name: stats.student_name,
        student_number: stats.student_number,
        class_name: stats.class_name,
        total_records: stats.total_records,
        present_count: stats.present_count,
        absent_count: stats.absent_count,
        excused_count: stats.excused_count,
    }
}
