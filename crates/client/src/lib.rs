//! Typed HTTP client for the attendance API.
//!
//! Every call that needs authentication takes a [`Session`] and refuses to
//! send once its token has expired.

use api_types::{
    ErrorBody, Health, Message,
    assignment::{Assignment, AssignmentNew, AssignmentQuery},
    attendance::{
        AttendanceSubmit, AttendanceSubmitted, HistoryQuery, RecordsQuery, RosterQuery,
        SessionRecords, SessionSummary, StatsQuery, StudentStats,
    },
    auth::{LoginRequest, LoginResponse, Profile, UserProfile},
    class::{Class, ClassNew},
    student::{Student, StudentNew, StudentQuery},
    subject::{Subject, SubjectNew},
    teacher::{Teacher, TeacherNew},
    user::{CredentialsUpdate, CredentialsUpdated, UserDetail},
};
use chrono::Utc;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

pub use session::Session;

mod session;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("session expired, log in again")]
    SessionExpired,
    #[error("malformed session token")]
    InvalidToken,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    fn from_response(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest(message),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            other => Self::Server {
                status: other.as_u16(),
                message,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(err.to_string()))
    }

    fn authorized(
        &self,
        method: Method,
        path: &str,
        session: &Session,
    ) -> Result<RequestBuilder, ClientError> {
        let token = session.bearer(Utc::now())?;
        Ok(self.http.request(method, self.url(path)?).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let res = request.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res.json::<T>().await?);
        }

        let message = res
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        tracing::debug!(status = status.as_u16(), "request failed: {message}");
        Err(ClientError::from_response(status, message))
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        Self::send(self.http.get(self.url("health")?)).await
    }

    /// Exchanges credentials for a [`Session`].
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let payload = LoginRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        };
        let response: LoginResponse =
            Self::send(self.http.post(self.url("api/auth/login")?).json(&payload)).await?;
        Session::try_from(response)
    }

    pub async fn profile(&self, session: &Session) -> Result<Profile, ClientError> {
        Self::send(self.authorized(Method::GET, "api/auth/profile", session)?).await
    }

    pub async fn classes(&self, session: &Session) -> Result<Vec<Class>, ClientError> {
        Self::send(self.authorized(Method::GET, "api/admin/classes", session)?).await
    }

    pub async fn create_class(
        &self,
        session: &Session,
        class_name: &str,
        class_code: &str,
    ) -> Result<Class, ClientError> {
        let payload = ClassNew {
            class_name: Some(class_name.to_string()),
            class_code: Some(class_code.to_string()),
        };
        let request = self.authorized(Method::POST, "api/admin/classes", session)?;
        Self::send(request.json(&payload)).await
    }

    pub async fn delete_class(&self, session: &Session, id: i32) -> Result<Message, ClientError> {
        let path = format!("api/admin/classes/{id}");
        Self::send(self.authorized(Method::DELETE, &path, session)?).await
    }

    pub async fn subjects(&self, session: &Session) -> Result<Vec<Subject>, ClientError> {
        Self::send(self.authorized(Method::GET, "api/admin/subjects", session)?).await
    }

    pub async fn create_subject(
        &self,
        session: &Session,
        subject_name: &str,
        subject_code: &str,
    ) -> Result<Subject, ClientError> {
        let payload = SubjectNew {
            subject_name: Some(subject_name.to_string()),
            subject_code: Some(subject_code.to_string()),
        };
        let request = self.authorized(Method::POST, "api/admin/subjects", session)?;
        Self::send(request.json(&payload)).await
    }

    pub async fn delete_subject(
        &self,
        session: &Session,
        id: i32,
    ) -> Result<Message, ClientError> {
        let path = format!("api/admin/subjects/{id}");
        Self::send(self.authorized(Method::DELETE, &path, session)?).await
    }

    /// All students, or only those of `class_id`.
    pub async fn students(
        &self,
        session: &Session,
        class_id: Option<i32>,
    ) -> Result<Vec<Student>, ClientError> {
        let request = self.authorized(Method::GET, "api/admin/students", session)?;
        Self::send(request.query(&StudentQuery { class_id })).await
    }

    pub async fn create_student(
        &self,
        session: &Session,
        student_name: &str,
        student_id: &str,
        class_id: i32,
    ) -> Result<Student, ClientError> {
        let payload = StudentNew {
            student_name: Some(student_name.to_string()),
            student_id: Some(student_id.to_string()),
            class_id: Some(class_id),
        };
        let request = self.authorized(Method::POST, "api/admin/students", session)?;
        Self::send(request.json(&payload)).await
    }

    pub async fn delete_student(
        &self,
        session: &Session,
        id: i32,
    ) -> Result<Message, ClientError> {
        let path = format!("api/admin/students/{id}");
        Self::send(self.authorized(Method::DELETE, &path, session)?).await
    }

    pub async fn teachers(&self, session: &Session) -> Result<Vec<Teacher>, ClientError> {
        Self::send(self.authorized(Method::GET, "api/admin/teachers", session)?).await
    }

    pub async fn create_teacher(
        &self,
        session: &Session,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> Result<UserProfile, ClientError> {
        let payload = TeacherNew {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            full_name: Some(full_name.to_string()),
        };
        let request = self.authorized(Method::POST, "api/admin/teachers", session)?;
        Self::send(request.json(&payload)).await
    }

    pub async fn delete_teacher(
        &self,
        session: &Session,
        id: i32,
    ) -> Result<Message, ClientError> {
        let path = format!("api/admin/teachers/{id}");
        Self::send(self.authorized(Method::DELETE, &path, session)?).await
    }

    /// All assignments, or only those of `teacher_id`.
    pub async fn assignments(
        &self,
        session: &Session,
        teacher_id: Option<i32>,
    ) -> Result<Vec<Assignment>, ClientError> {
        let request = self.authorized(Method::GET, "api/admin/assignments", session)?;
        Self::send(request.query(&AssignmentQuery { teacher_id })).await
    }

    pub async fn create_assignment(
        &self,
        session: &Session,
        teacher_id: i32,
        class_id: i32,
        subject_id: i32,
    ) -> Result<Assignment, ClientError> {
        let payload = AssignmentNew {
            teacher_id: Some(teacher_id),
            class_id: Some(class_id),
            subject_id: Some(subject_id),
        };
        let request = self.authorized(Method::POST, "api/admin/assignments", session)?;
        Self::send(request.json(&payload)).await
    }

    pub async fn delete_assignment(
        &self,
        session: &Session,
        id: i32,
    ) -> Result<Message, ClientError> {
        let path = format!("api/admin/assignments/{id}");
        Self::send(self.authorized(Method::DELETE, &path, session)?).await
    }

    pub async fn attendance_records(
        &self,
        session: &Session,
        query: &RecordsQuery,
    ) -> Result<Vec<SessionRecords>, ClientError> {
        let request = self.authorized(Method::GET, "api/admin/attendance", session)?;
        Self::send(request.query(query)).await
    }

    pub async fn student_stats(
        &self,
        session: &Session,
        query: &StatsQuery,
    ) -> Result<Vec<StudentStats>, ClientError> {
        let request =
            self.authorized(Method::GET, "api/admin/attendance/student-stats", session)?;
        Self::send(request.query(query)).await
    }

    /// Assignments of the logged-in teacher.
    pub async fn my_assignments(&self, session: &Session) -> Result<Vec<Assignment>, ClientError> {
        Self::send(self.authorized(Method::GET, "api/teacher/assignments", session)?).await
    }

    pub async fn roster(
        &self,
        session: &Session,
        class_id: i32,
        subject_id: i32,
    ) -> Result<Vec<Student>, ClientError> {
        let query = RosterQuery {
            class_id: Some(class_id),
            subject_id: Some(subject_id),
        };
        let request = self.authorized(Method::GET, "api/teacher/students", session)?;
        Self::send(request.query(&query)).await
    }

    pub async fn submit_attendance(
        &self,
        session: &Session,
        submission: &AttendanceSubmit,
    ) -> Result<AttendanceSubmitted, ClientError> {
        let request = self.authorized(Method::POST, "api/teacher/attendance", session)?;
        Self::send(request.json(submission)).await
    }

    pub async fn attendance_history(
        &self,
        session: &Session,
        query: &HistoryQuery,
    ) -> Result<Vec<SessionSummary>, ClientError> {
        let request = self.authorized(Method::GET, "api/teacher/attendance/history", session)?;
        Self::send(request.query(query)).await
    }

    pub async fn user_detail(
        &self,
        session: &Session,
        user_id: i32,
    ) -> Result<UserDetail, ClientError> {
        let path = format!("api/users/{user_id}");
        Self::send(self.authorized(Method::GET, &path, session)?).await
    }

    pub async fn update_credentials(
        &self,
        session: &Session,
        user_id: i32,
        update: &CredentialsUpdate,
    ) -> Result<CredentialsUpdated, ClientError> {
        let path = format!("api/users/{user_id}/credentials");
        let request = self.authorized(Method::PUT, &path, session)?;
        Self::send(request.json(update)).await
    }
}
