//! Subject API endpoints

use api_types::{
    Message,
    subject::{Subject, SubjectNew},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{ServerError, convert, extract::{JsonBody, PathParam}, present, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Subject>>, ServerError> {
    let subjects = state.engine.list_subjects().await?;
    Ok(Json(subjects.into_iter().map(convert::subject).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<SubjectNew>,
) -> Result<(StatusCode, Json<Subject>), ServerError> {
    let (Some(name), Some(code)) = (
        present(&payload.subject_name),
        present(&payload.subject_code),
    ) else {
        return Err(ServerError::Generic(
            "Subject name and code are required".to_string(),
        ));
    };

    let subject = state.engine.create_subject(name, code).await?;
    Ok((StatusCode::CREATED, Json(convert::subject(subject))))
}

pub async fn remove(
    State(state): State<ServerState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_subject(id).await?;
    Ok(Json(Message {
        message: "Subject deleted successfully".to_string(),
    }))
}
