//! Logged-in state held by a client.
//!
//! Expiry is read once from the token claims and checked whenever the
//! session is used. Nothing runs in the background.

use api_types::auth::{LoginResponse, UserProfile};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::ClientError;

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    token: String,
    user: UserProfile,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Builds a session from a token, reading its expiry from the claims.
    pub fn new(token: String, user: UserProfile) -> Result<Self, ClientError> {
        let expires_at = token_expiry(&token)?;
        Ok(Self {
            token,
            user,
            expires_at,
        })
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The token to send at `now`, or `SessionExpired`.
    pub fn bearer(&self, now: DateTime<Utc>) -> Result<&str, ClientError> {
        if self.is_expired(now) {
            return Err(ClientError::SessionExpired);
        }
        Ok(&self.token)
    }
}

impl TryFrom<LoginResponse> for Session {
    type Error = ClientError;

    fn try_from(value: LoginResponse) -> Result<Self, Self::Error> {
        Self::new(value.token, value.user)
    }
}

fn token_expiry(token: &str) -> Result<DateTime<Utc>, ClientError> {
    let (payload, _signature) = token.split_once('.').ok_or(ClientError::InvalidToken)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| ClientError::InvalidToken)?;
    let claim: ExpiryClaim =
        serde_json::from_slice(&bytes).map_err(|_| ClientError::InvalidToken)?;
    DateTime::from_timestamp(claim.exp, 0).ok_or(ClientError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use api_types::Role;
    use chrono::Duration;

    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: 2,
            username: "mrs.smith".to_string(),
            full_name: "Jane Smith".to_string(),
            role: Role::Teacher,
        }
    }

    fn token_expiring_at(exp: i64) -> String {
        let claims = format!(r#"{{"sub":2,"role":"teacher","iat":{},"exp":{exp}}}"#, exp - 86400);
        format!("{}.c2lnbmF0dXJl", URL_SAFE_NO_PAD.encode(claims))
    }

    #[test]
    fn expiry_comes_from_claims() {
        let exp = Utc::now().timestamp() + 3600;
        let session = Session::new(token_expiring_at(exp), profile()).unwrap();
        assert_eq!(session.expires_at().timestamp(), exp);
        assert_eq!(session.user().username, "mrs.smith");
    }

    #[test]
    fn bearer_is_refused_once_expired() {
        let now = Utc::now();
        let session =
            Session::new(token_expiring_at(now.timestamp() + 60), profile()).unwrap();

        assert!(session.bearer(now).is_ok());
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::seconds(60)));
        assert!(matches!(
            session.bearer(now + Duration::minutes(5)),
            Err(ClientError::SessionExpired)
        ));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for token in ["", "no-dot", "!!!.sig", "e30.sig"] {
            assert!(
                matches!(
                    Session::new(token.to_string(), profile()),
                    Err(ClientError::InvalidToken)
                ),
                "{token}"
            );
        }
    }
}
