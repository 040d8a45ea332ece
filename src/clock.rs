//! Injectable clock source (§9: "the pipeline and CRL generator depend on an
//! injectable clock source so tests can advance time").

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Anything that can report the current time.
pub trait Clock: Send + Sync {
    /// The current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock, backed by [`Utc::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock whose value can be moved forward/backward, for exercising
/// expiry-related edge cases without sleeping in tests.
#[derive(Debug)]
pub struct FixedClock {
    millis_since_epoch: AtomicI64,
}

impl FixedClock {
    /// Creates a clock pinned to the given instant.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis_since_epoch: AtomicI64::new(at.timestamp_millis()),
        }
    }

    /// Moves the clock forward by the given number of seconds (negative
    /// values move it backward).
    pub fn advance_seconds(&self, seconds: i64) {
        self.millis_since_epoch
            .fetch_add(seconds * 1000, Ordering::SeqCst);
    }

    /// Pins the clock to a new instant.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis_since_epoch
            .store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis_since_epoch.load(Ordering::SeqCst))
            .unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance_seconds(60);
        assert_eq!(clock.now(), start + chrono::Duration::seconds(60));
        clock.advance_seconds(-120);
        assert_eq!(clock.now(), start - chrono::Duration::seconds(60));
    }
}
