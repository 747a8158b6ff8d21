//! Time source abstraction so expiry, cooldown and day roll-over can be tested.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};
use std::sync::{Arc, RwLock};

/// Source of the current instant and the server-local calendar
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Offset used to derive the server-local calendar day
    fn local_offset(&self) -> FixedOffset;

    /// Server-local calendar date of `instant`
    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.local_offset()).date_naive()
    }

    /// First instant of the server-local day after `instant`
    fn next_local_midnight(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let offset = self.local_offset();
        let tomorrow = self.local_date(instant).succ_opt().unwrap_or(NaiveDate::MAX);
        let midnight = tomorrow.and_hms_opt(0, 0, 0).unwrap_or_default();
        // Fixed offsets have no gaps, so local midnight maps to exactly one instant
        (midnight - Duration::seconds(offset.local_minus_utc() as i64)).and_utc()
    }
}

/// Wall clock in the host's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

/// Settable clock for tests and simulations
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock frozen at `now`, with a UTC local calendar
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut current) = self.now.write() {
            *current = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut current) = self.now.write() {
            *current += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn local_offset(&self) -> FixedOffset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);

        clock.advance(Duration::seconds(59));
        assert_eq!(clock.now(), start + Duration::seconds(59));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn next_midnight_in_utc() {
        let clock = ManualClock::new(Utc::now());
        let instant = Utc.with_ymd_and_hms(2024, 2, 28, 23, 30, 0).unwrap();

        assert_eq!(
            clock.next_local_midnight(instant),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn local_calendar_follows_offset() {
        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();
        let clock = ManualClock::with_offset(Utc::now(), plus_three);

        // 22:30 UTC is already the next day at +03:00
        let instant = Utc.with_ymd_and_hms(2024, 6, 10, 22, 30, 0).unwrap();
        assert_eq!(
            clock.local_date(instant),
            NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()
        );
        assert_eq!(
            clock.next_local_midnight(instant),
            Utc.with_ymd_and_hms(2024, 6, 11, 21, 0, 0).unwrap()
        );
    }
}
