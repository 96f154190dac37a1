//! Signed, time-limited bearer tokens.
//!
//! Format: `base64url(claims JSON) "." base64url(HMAC-SHA256(secret, first part))`.
//! Claims carry the user id, role and the issue/expiry instants as unix
//! seconds.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{EngineError, Identity, ResultEngine, Role};

type HmacSha256 = Hmac<Sha256>;

/// Validity of every issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.sub,
            role: self.role,
        }
    }
}

#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &str) -> ResultEngine<Self> {
        if secret.trim().is_empty() {
            return Err(EngineError::Validation(
                "token secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            key: secret.as_bytes().to_vec(),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        })
    }

    fn mac(&self) -> ResultEngine<HmacSha256> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|_| EngineError::Unauthenticated("invalid signing key".to_string()))
    }

    /// Issues a token for `identity` valid from `now` for 24 hours.
    pub fn issue(&self, identity: Identity, now: DateTime<Utc>) -> ResultEngine<String> {
        let claims = Claims {
            sub: identity.user_id,
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims)
            .map_err(|err| EngineError::Validation(format!("invalid claims: {err}")))?;
        let payload = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Verifies signature first, then expiry.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> ResultEngine<Claims> {
        let invalid = || EngineError::Unauthenticated("Invalid token".to_string());

        let (payload, signature) = token.split_once('.').ok_or_else(invalid)?;
        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| invalid())?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| invalid())?;

        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| invalid())?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| invalid())?;

        if claims.exp <= now.timestamp() {
            return Err(EngineError::TokenExpired);
        }
        Ok(claims)
    }
}
