//! Claims carried by the pre-auth ("email verified") token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the `purpose` claim
pub const PRE_AUTH_PURPOSE: &str = "email-verified";

/// Claims structure for the pre-auth JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAuthClaims {
    /// Always `email-verified`
    pub purpose: String,

    /// Normalized email that was just verified
    pub email: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// JWT ID
    pub jti: String,
}

impl PreAuthClaims {
    pub fn new(email: impl Into<String>, issuer: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            purpose: PRE_AUTH_PURPOSE.to_string(),
            email: email.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: issuer.into(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Expired once `now` reaches `exp` (no leeway)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
