//! Login and token introspection endpoints

use api_types::auth::{LoginRequest, LoginResponse, Profile};
use axum::{Extension, Json, extract::State};
use engine::Identity;

use crate::{ServerError, convert, extract::JsonBody, present, server::ServerState};

/// Handle login requests. Answers with a bearer token and the public profile.
pub async fn login(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let (Some(username), Some(password)) = (
        present(&payload.username),
        payload.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ServerError::Generic(
            "Username and password are required".to_string(),
        ));
    };

    let outcome = state.engine.login(username, password).await?;
    Ok(Json(LoginResponse {
        token: outcome.token,
        user: convert::profile(outcome.user),
    }))
}

pub async fn profile(Extension(identity): Extension<Identity>) -> Json<Profile> {
    Json(Profile {
        user_id: identity.user_id,
        role: convert::role(identity.role),
    })
}
