//! Teacher account endpoints, admin only

use api_types::{
    Message,
    auth::UserProfile,
    teacher::{Teacher, TeacherNew},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{ServerError, convert, extract::{JsonBody, PathParam}, present, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Teacher>>, ServerError> {
    let teachers = state.engine.list_teachers().await?;
    Ok(Json(teachers.into_iter().map(convert::teacher).collect()))
}

/// Handle requests for creating a teacher account
pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<TeacherNew>,
) -> Result<(StatusCode, Json<UserProfile>), ServerError> {
    let (Some(username), Some(password), Some(full_name)) = (
        present(&payload.username),
        payload.password.as_deref().filter(|p| !p.is_empty()),
        present(&payload.full_name),
    ) else {
        return Err(ServerError::Generic("All fields are required".to_string()));
    };

    let teacher = state
        .engine
        .create_teacher(username, password, full_name)
        .await?;
    Ok((StatusCode::CREATED, Json(convert::profile(teacher))))
}

pub async fn remove(
    State(state): State<ServerState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_teacher(id).await?;
    Ok(Json(Message {
        message: "Teacher deleted successfully".to_string(),
    }))
}
