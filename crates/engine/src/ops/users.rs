use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, Identity, ResultEngine, UserDetail, UserProfile,
    password::{hash_password, verify_password},
    users,
};

use super::{Engine, normalize_required, on_unique, with_tx};

/// Requested changes to an account. Unset fields stay as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialsUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Required when the requester changes their own account.
    pub current_password: Option<String>,
}

impl CredentialsUpdate {
    fn is_empty(&self) -> bool {
        let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
        blank(&self.username) && blank(&self.password)
    }
}

impl Engine {
    pub async fn user_detail(&self, requester: Identity, user_id: i32) -> ResultEngine<UserDetail> {
        if !requester.can_manage(user_id) {
            return Err(EngineError::Forbidden("Insufficient permissions".to_string()));
        }
        let model = self.require_user(&self.database, user_id).await?;
        UserDetail::try_from(model)
    }

    /// Changes username and/or password of `user_id`.
    ///
    /// Teachers may only change their own account and must confirm with the
    /// current password. Admins changing another account skip that check.
    pub async fn update_credentials(
        &self,
        requester: Identity,
        user_id: i32,
        update: CredentialsUpdate,
    ) -> ResultEngine<UserProfile> {
        if !requester.can_manage(user_id) {
            return Err(EngineError::Forbidden(
                "You can only update your own credentials".to_string(),
            ));
        }
        if update.is_empty() {
            return Err(EngineError::NoChangesProvided);
        }

        let username = match update.username.as_deref() {
            Some(value) if !value.trim().is_empty() => Some(normalize_required(value, "username")?),
            _ => None,
        };
        let password_hash = match update.password.as_deref() {
            Some(value) if !value.is_empty() => Some(hash_password(value)?),
            _ => None,
        };
        let self_update = requester.user_id == user_id;

        let profile = with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;

            if self_update {
                let current = update
                    .current_password
                    .as_deref()
                    .ok_or(EngineError::InvalidCurrentPassword)?;
                if !verify_password(current, &model.password_hash)? {
                    return Err(EngineError::InvalidCurrentPassword);
                }
            }

            if let Some(username) = username.as_deref() {
                let taken = users::Entity::find()
                    .filter(users::Column::Username.eq(username))
                    .filter(users::Column::Id.ne(user_id))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::DuplicateUsername);
                }
            }

            let mut active: users::ActiveModel = model.into();
            if let Some(username) = username {
                active.username = ActiveValue::Set(username);
            }
            if let Some(password_hash) = password_hash {
                active.password_hash = ActiveValue::Set(password_hash);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active
                .update(&db_tx)
                .await
                .map_err(|err| on_unique(err, || EngineError::DuplicateUsername))?;

            UserProfile::try_from(model)
        })?;

        tracing::info!(user_id, requester = requester.user_id, "credentials updated");
        Ok(profile)
    }
}
