//! Class API endpoints

use api_types::{
    Message,
    class::{Class, ClassNew},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{ServerError, convert, extract::{JsonBody, PathParam}, present, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Class>>, ServerError> {
    let classes = state.engine.list_classes().await?;
    Ok(Json(classes.into_iter().map(convert::class).collect()))
}

/// Handle requests for creating a new class
pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<ClassNew>,
) -> Result<(StatusCode, Json<Class>), ServerError> {
    let (Some(name), Some(code)) = (present(&payload.class_name), present(&payload.class_code))
    else {
        return Err(ServerError::Generic(
            "Class name and code are required".to_string(),
        ));
    };

    let class = state.engine.create_class(name, code).await?;
    Ok((StatusCode::CREATED, Json(convert::class(class))))
}

pub async fn remove(
    State(state): State<ServerState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_class(id).await?;
    Ok(Json(Message {
        message: "Class deleted successfully".to_string(),
    }))
}
