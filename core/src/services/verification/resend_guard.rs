//! Resend cooldown and daily quota enforcement.

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::verification_meta::{day_key, ResendMeta};
use crate::errors::AuthError;
use crate::services::clock::Clock;

/// Why a resend was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendDenial {
    /// Too soon after the previous code
    Cooldown { retry_after_seconds: i64 },
    /// Daily quota used up
    DailyLimit { retry_after_seconds: i64 },
}

impl From<ResendDenial> for AuthError {
    fn from(denial: ResendDenial) -> Self {
        match denial {
            ResendDenial::Cooldown { retry_after_seconds } => {
                AuthError::CooldownActive { retry_after_seconds }
            }
            ResendDenial::DailyLimit { retry_after_seconds } => {
                AuthError::DailyLimitExceeded { retry_after_seconds }
            }
        }
    }
}

/// Stateless policy applied to a `ResendMeta` loaded inside a store transaction
#[derive(Debug, Clone)]
pub struct ResendGuard {
    cooldown: Duration,
    daily_limit: u32,
}

impl ResendGuard {
    pub fn new(cooldown_seconds: i64, daily_limit: u32) -> Self {
        Self {
            cooldown: Duration::seconds(cooldown_seconds.max(0)),
            daily_limit,
        }
    }

    /// Check the quota and, when allowed, record the send in `meta`
    ///
    /// The day bucket rolls over first; cooldown is evaluated before the daily
    /// limit. On denial `meta` may still carry a rolled-over day bucket.
    pub fn check_and_record(
        &self,
        meta: &mut ResendMeta,
        now: DateTime<Utc>,
        clock: &dyn Clock,
    ) -> Result<(), ResendDenial> {
        meta.roll_over(&day_key(clock.local_date(now)));

        if let Some(last) = meta.last_sent_at {
            let elapsed = now - last;
            if elapsed < self.cooldown {
                return Err(ResendDenial::Cooldown {
                    retry_after_seconds: ceil_seconds(self.cooldown - elapsed),
                });
            }
        }

        if meta.sent_count >= self.daily_limit {
            let midnight = clock.next_local_midnight(now);
            return Err(ResendDenial::DailyLimit {
                retry_after_seconds: ceil_seconds(midnight - now),
            });
        }

        meta.record_send(now);
        Ok(())
    }

    /// Earliest instant the next resend would pass the cooldown
    pub fn next_allowed_at(&self, meta: &ResendMeta) -> Option<DateTime<Utc>> {
        meta.last_sent_at.map(|last| last + self.cooldown)
    }
}

/// Whole seconds, rounded up, never below one
fn ceil_seconds(remaining: Duration) -> i64 {
    let millis = remaining.num_milliseconds();
    ((millis + 999) / 1000).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::ManualClock;
    use chrono::TimeZone;

    fn guard() -> ResendGuard {
        ResendGuard::new(60, 5)
    }

    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn first_send_is_allowed_and_recorded() {
        let clock = ManualClock::new(morning());
        let mut meta = ResendMeta::default();

        assert!(guard().check_and_record(&mut meta, morning(), &clock).is_ok());
        assert_eq!(meta.sent_count, 1);
        assert_eq!(meta.last_sent_at, Some(morning()));
        assert_eq!(meta.day_key, "20240501");
    }

    #[test]
    fn cooldown_boundary() {
        let clock = ManualClock::new(morning());
        let mut meta = ResendMeta::default();
        guard().check_and_record(&mut meta, morning(), &clock).unwrap();

        let almost = morning() + Duration::seconds(59);
        assert_eq!(
            guard().check_and_record(&mut meta, almost, &clock),
            Err(ResendDenial::Cooldown { retry_after_seconds: 1 })
        );

        let exactly = morning() + Duration::seconds(60);
        assert!(guard().check_and_record(&mut meta, exactly, &clock).is_ok());
        assert_eq!(meta.sent_count, 2);
    }

    #[test]
    fn cooldown_retry_after_rounds_up() {
        let clock = ManualClock::new(morning());
        let mut meta = ResendMeta::default();
        guard().check_and_record(&mut meta, morning(), &clock).unwrap();

        let later = morning() + Duration::milliseconds(10_500);
        assert_eq!(
            guard().check_and_record(&mut meta, later, &clock),
            Err(ResendDenial::Cooldown { retry_after_seconds: 50 })
        );
        assert_eq!(meta.sent_count, 1);
    }

    #[test]
    fn daily_limit_then_roll_over() {
        let clock = ManualClock::new(morning());
        let mut meta = ResendMeta::default();
        let mut now = morning();

        for _ in 0..5 {
            guard().check_and_record(&mut meta, now, &clock).unwrap();
            now += Duration::seconds(60);
        }

        // 09:05 -> midnight is 14h55m away
        assert_eq!(
            guard().check_and_record(&mut meta, now, &clock),
            Err(ResendDenial::DailyLimit {
                retry_after_seconds: 14 * 3600 + 55 * 60
            })
        );

        let tomorrow = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        assert!(guard().check_and_record(&mut meta, tomorrow, &clock).is_ok());
        assert_eq!(meta.sent_count, 1);
        assert_eq!(meta.day_key, "20240502");
    }

    #[test]
    fn cooldown_is_reported_before_daily_limit() {
        let clock = ManualClock::new(morning());
        let mut meta = ResendMeta {
            last_sent_at: Some(morning()),
            sent_count: 5,
            day_key: "20240501".to_string(),
        };

        let result = guard().check_and_record(&mut meta, morning() + Duration::seconds(1), &clock);
        assert!(matches!(result, Err(ResendDenial::Cooldown { .. })));
    }

    #[test]
    fn next_allowed_at_is_last_send_plus_cooldown() {
        let meta = ResendMeta {
            last_sent_at: Some(morning()),
            sent_count: 1,
            day_key: "20240501".to_string(),
        };
        assert_eq!(
            guard().next_allowed_at(&meta),
            Some(morning() + Duration::seconds(60))
        );
        assert_eq!(guard().next_allowed_at(&ResendMeta::default()), None);
    }
}
