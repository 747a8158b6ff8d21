//! Per-identity bookkeeping for resend throttling and attempt lockout.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Format of the calendar-day bucket key (`YYYYMMDD`)
pub const DAY_KEY_FORMAT: &str = "%Y%m%d";

/// Build the day bucket key for a local calendar date
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Resend bookkeeping for one email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendMeta {
    /// When the last code was issued
    pub last_sent_at: Option<DateTime<Utc>>,

    /// Codes issued within `day_key`
    pub sent_count: u32,

    /// Server-local calendar day the counter belongs to
    pub day_key: String,
}

impl ResendMeta {
    /// Reset the counter if the stored bucket is not `today`
    pub fn roll_over(&mut self, today: &str) {
        if self.day_key != today {
            self.day_key = today.to_string();
            self.sent_count = 0;
        }
    }

    pub fn record_send(&mut self, now: DateTime<Utc>) {
        self.sent_count += 1;
        self.last_sent_at = Some(now);
    }
}

/// Failed-verification bookkeeping for one email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptMeta {
    /// Consecutive failed verifications since the last reset
    pub count: u32,

    /// Verification is refused until this instant
    pub locked_until: Option<DateTime<Utc>>,
}

impl AttemptMeta {
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.locked_until, Some(until) if now < until)
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.locked_until = None;
    }
}
