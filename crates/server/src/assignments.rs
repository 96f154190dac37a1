//! Teacher assignment endpoints, admin only

use api_types::{
    Message,
    assignment::{Assignment, AssignmentNew, AssignmentQuery},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{ServerError, convert, extract::{JsonBody, PathParam, QueryParams}, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<AssignmentQuery>,
) -> Result<Json<Vec<Assignment>>, ServerError> {
    let assignments = state.engine.list_assignments(query.teacher_id).await?;
    Ok(Json(assignments.into_iter().map(convert::assignment).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<AssignmentNew>,
) -> Result<(StatusCode, Json<Assignment>), ServerError> {
    let (Some(teacher_id), Some(class_id), Some(subject_id)) =
        (payload.teacher_id, payload.class_id, payload.subject_id)
    else {
        return Err(ServerError::Generic("All fields are required".to_string()));
    };

    let assignment = state
        .engine
        .create_assignment(teacher_id, class_id, subject_id)
        .await?;
    Ok((StatusCode::CREATED, Json(convert::assignment(assignment))))
}

pub async fn remove(
    State(state): State<ServerState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_assignment(id).await?;
    Ok(Json(Message {
        message: "Assignment deleted successfully".to_string(),
    }))
}
