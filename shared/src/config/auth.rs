//! Pre-auth token and password policy configuration

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};

const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

/// Configuration for the short-lived "email verified" token
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreAuthConfig {
    /// HMAC secret used to sign pre-auth tokens
    pub secret: String,

    /// Token lifetime in minutes
    pub ttl_minutes: i64,

    /// JWT issuer claim
    pub issuer: String,
}

impl Default for PreAuthConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            ttl_minutes: 30,
            issuer: String::from("takip"),
        }
    }
}

impl PreAuthConfig {
    /// Create a new configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables, falling back to `JWT_SECRET`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env_opt("PRE_AUTH_SECRET")
                .or_else(|| env_opt("JWT_SECRET"))
                .unwrap_or(defaults.secret),
            ttl_minutes: env_or("PRE_AUTH_TTL_MIN", defaults.ttl_minutes),
            issuer: env_opt("PRE_AUTH_ISSUER").unwrap_or(defaults.issuer),
        }
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Password acceptance and hashing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordConfig {
    /// Minimum password length in characters
    pub min_length: usize,

    /// bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            bcrypt_cost: 12,
        }
    }
}

impl PasswordConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_length: env_or("PASSWORD_MIN_LENGTH", defaults.min_length),
            bcrypt_cost: env_or("BCRYPT_COST", defaults.bcrypt_cost),
        }
    }
}
