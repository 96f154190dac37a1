//! Domain services of the attendance system.
//!
//! [`Engine`] owns the database pool and the token signer. Every operation
//! that touches more than one row runs inside a single database transaction.

pub use attendance_records::AttendanceStatus;
pub use attendance_sessions::{AttendanceEntry, NewAttendance};
pub use classes::Class;
pub use error::EngineError;
pub use ops::{CredentialsUpdate, Engine, EngineBuilder, LoginOutcome};
pub use reports::{
    AttendanceFilter, HistoryFilter, RecordEntry, SessionRecords, SessionSummary, StatsFilter,
    StudentStats,
};
pub use students::Student;
pub use subjects::Subject;
pub use teacher_assignments::Assignment;
pub use token::{Claims, TOKEN_TTL_HOURS, TokenSigner};
pub use users::{Identity, Role, Teacher, UserDetail, UserProfile};

mod attendance_records;
mod attendance_sessions;
mod classes;
mod error;
mod ops;
mod password;
mod reports;
mod students;
mod subjects;
mod teacher_assignments;
mod token;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
