use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, prelude::*};

use crate::{
    EngineError, Identity, ResultEngine, Role, UserProfile,
    password::{hash_password, verify_password},
    users,
};

use super::{Engine, normalize_required, on_unique};

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserProfile,
}

impl Engine {
    /// Exchanges credentials for a 24h token.
    ///
    /// An unknown username and a wrong password fail the same way.
    pub async fn login(&self, username: &str, password: &str) -> ResultEngine<LoginOutcome> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.database)
            .await?
            .ok_or(EngineError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(EngineError::InvalidCredentials);
        }

        let user = UserProfile::try_from(user)?;
        let token = self.tokens.issue(
            Identity {
                user_id: user.id,
                role: user.role,
            },
            Utc::now(),
        )?;

        Ok(LoginOutcome { token, user })
    }

    /// Resolves a bearer token into the caller identity.
    pub fn authenticate(&self, token: &str) -> ResultEngine<Identity> {
        self.tokens
            .verify(token, Utc::now())
            .map(|claims| claims.identity())
    }

    /// Creates an account with a freshly hashed password.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> ResultEngine<UserProfile> {
        let username = normalize_required(username, "username")?;
        let full_name = normalize_required(full_name, "full name")?;
        if password.is_empty() {
            return Err(EngineError::Validation("password is required".to_string()));
        }

        let password_hash = hash_password(password)?;
        let now = Utc::now();
        let active = users::ActiveModel {
            username: ActiveValue::Set(username),
            password_hash: ActiveValue::Set(password_hash),
            full_name: ActiveValue::Set(full_name),
            role: ActiveValue::Set(role.as_str().to_string()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let model = active
            .insert(&self.database)
            .await
            .map_err(|err| on_unique(err, || EngineError::DuplicateUsername))?;

        UserProfile::try_from(model)
    }
}
