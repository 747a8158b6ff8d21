//! One-time code configuration

use serde::{Deserialize, Serialize};

use super::{env_flag, env_or};

/// Lifetime, resend and lockout limits for email one-time codes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Minutes a code stays valid after issuance
    pub expire_minutes: i64,

    /// Minimum seconds between two issuances for the same email
    pub resend_cooldown_seconds: i64,

    /// Maximum issuances per email per calendar day
    pub daily_limit: u32,

    /// Failed verifications before the email is locked
    pub max_attempts: u32,

    /// Minutes an email stays locked after too many failures
    pub lock_minutes: i64,

    /// Echo raw codes in API responses (never honored in production)
    #[serde(default)]
    pub dev_return_code: bool,

    /// Return 404 for unknown emails on forgot-password instead of a silent success
    #[serde(default)]
    pub reveal_unknown_accounts: bool,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            expire_minutes: 15,
            resend_cooldown_seconds: 60,
            daily_limit: 5,
            max_attempts: 5,
            lock_minutes: 15,
            dev_return_code: false,
            reveal_unknown_accounts: false,
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            expire_minutes: env_or("OTP_EXPIRE_MIN", defaults.expire_minutes),
            resend_cooldown_seconds: env_or(
                "OTP_RESEND_COOLDOWN_SEC",
                defaults.resend_cooldown_seconds,
            ),
            daily_limit: env_or("OTP_DAILY_LIMIT", defaults.daily_limit),
            max_attempts: env_or("OTP_MAX_ATTEMPTS", defaults.max_attempts),
            lock_minutes: env_or("OTP_LOCK_MIN", defaults.lock_minutes),
            dev_return_code: env_flag("DEV_RETURN_CODE"),
            reveal_unknown_accounts: env_flag("OTP_REVEAL_UNKNOWN_ACCOUNTS"),
        }
    }
}
