//! Configuration for the verification service

use std::time::Duration as StdDuration;

use chrono::Duration;
use takip_shared::config::{MailConfig, OtpConfig};

use crate::domain::entities::verification_code::DEFAULT_EXPIRATION_MINUTES;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Number of minutes before a verification code expires
    pub code_expiration_minutes: i64,
    /// Minimum seconds between code resend requests
    pub resend_cooldown_seconds: i64,
    /// Codes that may be issued per identity per local calendar day
    pub daily_limit: u32,
    /// Consecutive failures before verification is locked
    pub max_attempts: u32,
    /// Lockout length in minutes
    pub lock_minutes: i64,
    /// Echo issued codes in responses (never enabled in production)
    pub dev_return_code: bool,
    /// Answer 404 for unknown emails on the reset-password flow
    pub reveal_unknown_accounts: bool,
    /// Upper bound on a single mail delivery
    pub mail_timeout_seconds: u64,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
            resend_cooldown_seconds: 60,
            daily_limit: 5,
            max_attempts: 5,
            lock_minutes: 15,
            dev_return_code: false,
            reveal_unknown_accounts: false,
            mail_timeout_seconds: 15,
        }
    }
}

impl VerificationServiceConfig {
    /// Build from the OTP and mail settings
    ///
    /// `dev_return_code` is taken as given; callers decide whether the
    /// environment permits echoing codes.
    pub fn from_settings(otp: &OtpConfig, mail: &MailConfig) -> Self {
        Self {
            code_expiration_minutes: otp.expire_minutes,
            resend_cooldown_seconds: otp.resend_cooldown_seconds,
            daily_limit: otp.daily_limit,
            max_attempts: otp.max_attempts,
            lock_minutes: otp.lock_minutes,
            dev_return_code: otp.dev_return_code,
            reveal_unknown_accounts: otp.reveal_unknown_accounts,
            mail_timeout_seconds: mail.timeout_seconds,
        }
    }

    pub fn code_ttl(&self) -> Duration {
        Duration::minutes(self.code_expiration_minutes)
    }

    pub fn mail_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.mail_timeout_seconds)
    }
}
