//! Types for verification service results

use chrono::{DateTime, Utc};

/// Result of a code request
///
/// The HTTP layer answers `{ok:true}` for every variant so that callers cannot
/// tell whether a code was actually issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCodeOutcome {
    /// Whether a new code was generated and handed to the mailer
    pub issued: bool,
    /// The issued code, only when dev echo is enabled
    pub dev_code: Option<String>,
    /// When the next request for this identity will pass the cooldown
    pub next_resend_at: Option<DateTime<Utc>>,
}

impl RequestCodeOutcome {
    /// Nothing was issued and nothing was recorded
    pub(crate) fn noop() -> Self {
        Self {
            issued: false,
            dev_code: None,
            next_resend_at: None,
        }
    }
}

/// Result of a successful code verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCodeOutcome {
    /// Normalized email the code belonged to
    pub email: String,
    /// When the code was consumed
    pub verified_at: DateTime<Utc>,
}

/// Result of a successful pre-registration verification
#[derive(Debug, Clone)]
pub struct PreVerifyOutcome {
    /// Signed pre-auth token to present at registration
    pub pre_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}
