//! Account endpoints available to every authenticated user

use api_types::user::{CredentialsUpdate, CredentialsUpdated, UserDetail};
use axum::{
    Extension, Json,
    extract::State,
};
use engine::Identity;

use crate::{ServerError, convert, extract::{JsonBody, PathParam}, server::ServerState};

/// Account details of `user_id`, for the owner or an admin.
pub async fn detail(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    PathParam(user_id): PathParam<i32>,
) -> Result<Json<UserDetail>, ServerError> {
    let user = state.engine.user_detail(identity, user_id).await?;
    Ok(Json(convert::user_detail(user)))
}

/// Handle requests for changing username and/or password
pub async fn update_credentials(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    PathParam(user_id): PathParam<i32>,
    JsonBody(payload): JsonBody<CredentialsUpdate>,
) -> Result<Json<CredentialsUpdated>, ServerError> {
    let update = engine::CredentialsUpdate {
        username: payload.username,
        password: payload.password,
        current_password: payload.current_password,
    };
    let user = state
        .engine
        .update_credentials(identity, user_id, update)
        .await?;

    Ok(Json(CredentialsUpdated {
        message: "Credentials updated successfully".to_string(),
        user: convert::profile(user),
    }))
}
