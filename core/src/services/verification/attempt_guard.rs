//! Failed-verification counting and temporary lockout.

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::verification_meta::AttemptMeta;

/// Result of consulting the guard before a verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    NotLocked,
    Locked { until: DateTime<Utc> },
}

/// Lockout policy applied to an `AttemptMeta` loaded inside a store transaction
#[derive(Debug, Clone)]
pub struct AttemptGuard {
    max_attempts: u32,
    lock_duration: Duration,
}

impl AttemptGuard {
    pub fn new(max_attempts: u32, lock_minutes: i64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            lock_duration: Duration::minutes(lock_minutes.max(0)),
        }
    }

    pub fn check_lock(&self, meta: &AttemptMeta, now: DateTime<Utc>) -> LockStatus {
        match meta.locked_until {
            Some(until) if now < until => LockStatus::Locked { until },
            _ => LockStatus::NotLocked,
        }
    }

    /// Count a failure; at the threshold the lock is set and the counter cleared
    ///
    /// Returns the lock expiry when this failure triggered a lockout.
    pub fn record_failure(&self, meta: &mut AttemptMeta, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        meta.count += 1;
        if meta.count >= self.max_attempts {
            let until = now + self.lock_duration;
            meta.count = 0;
            meta.locked_until = Some(until);
            Some(until)
        } else {
            None
        }
    }

    pub fn reset(&self, meta: &mut AttemptMeta) {
        meta.reset();
    }

    /// Failures left before the next lockout
    pub fn remaining_attempts(&self, meta: &AttemptMeta) -> u32 {
        self.max_attempts.saturating_sub(meta.count)
    }
}
