//! Student API endpoints

use api_types::{
    Message,
    student::{Student, StudentNew, StudentQuery},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    ServerError, convert, extract::{JsonBody, PathParam, QueryParams}, present, server::ServerState,
};

/// All students, or one class's students with `?classId=`.
pub async fn list(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<StudentQuery>,
) -> Result<Json<Vec<Student>>, ServerError> {
    let students = state.engine.list_students(query.class_id).await?;
    Ok(Json(students.into_iter().map(convert::student).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<StudentNew>,
) -> Result<(StatusCode, Json<Student>), ServerError> {
    let (Some(name), Some(number), Some(class_id)) = (
        present(&payload.student_name),
        present(&payload.student_id),
        payload.class_id,
    ) else {
        return Err(ServerError::Generic("All fields are required".to_string()));
    };

    let student = state.engine.create_student(name, number, class_id).await?;
    Ok((StatusCode::CREATED, Json(convert::student(student))))
}

pub async fn remove(
    State(state): State<ServerState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_student(id).await?;
    Ok(Json(Message {
        message: "Student deleted successfully".to_string(),
    }))
}
