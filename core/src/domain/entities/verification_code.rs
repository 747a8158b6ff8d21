//! Verification code entity for email-based verification flows.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Default expiration time for verification codes (15 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 15;

/// What an issued code is allowed to prove
///
/// A code only redeems the flow it was issued for, so a reset-password code
/// can never satisfy an email verification and vice versa. Resend and attempt
/// counters are shared by all purposes of an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodePurpose {
    /// Confirm ownership of the email on an existing account
    VerifyEmail,
    /// Authorize a password reset
    ResetPassword,
    /// Prove ownership of an email before the account exists
    PreRegistration,
}

impl CodePurpose {
    pub const ALL: [CodePurpose; 3] = [
        CodePurpose::VerifyEmail,
        CodePurpose::ResetPassword,
        CodePurpose::PreRegistration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodePurpose::VerifyEmail => "verify-email",
            CodePurpose::ResetPassword => "reset-password",
            CodePurpose::PreRegistration => "pre-registration",
        }
    }
}

impl fmt::Display for CodePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodePurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CodePurpose::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown code purpose: {}", s))
    }
}

/// A single issued one-time code
///
/// Records are append-only: the only mutation after creation is setting
/// `used_at`, either on successful verification or when a newer code
/// supersedes this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Unique identifier for the verification code
    pub id: Uuid,

    /// Normalized email this code was sent to
    pub email: String,

    /// Flow the code belongs to
    pub purpose: CodePurpose,

    /// The zero-padded 6-digit code
    pub code: String,

    /// Timestamp when the code was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the code expires
    pub expires_at: DateTime<Utc>,

    /// Set once the code is consumed or superseded
    pub used_at: Option<DateTime<Utc>>,
}

impl VerificationCode {
    /// Creates a new code issued at `now` and valid for `ttl`
    pub fn issue(
        email: impl Into<String>,
        purpose: CodePurpose,
        code: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            purpose,
            code: code.into(),
            created_at: now,
            expires_at: now + ttl,
            used_at: None,
        }
    }

    /// A code is expired once `now` reaches `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Unused and not yet expired
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used() && !self.is_expired_at(now)
    }

    /// Constant-time comparison against a submitted code
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }

    /// Whether `candidate` would be accepted at `now`
    ///
    /// The comparison always runs so that a wrong code and an expired code
    /// take the same path.
    pub fn accepts(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        let matches = self.matches(candidate);
        matches && self.is_active_at(now)
    }

    /// Marks the code as consumed
    pub fn mark_used(&mut self, now: DateTime<Utc>) {
        if self.used_at.is_none() {
            self.used_at = Some(now);
        }
    }
}
