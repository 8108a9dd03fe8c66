//! Time management for the engine
//!
//! Every "now" the engine needs (default reading timestamps, estimate
//! timestamps, the recent-activity window, flag timestamps) comes from a
//! [`TimeSource`]. Production code uses [`SystemTime`]; tests use
//! [`FixedTime`] so windows can be checked to the second.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{ValidationError, ValidationResult};

/// Timezone-aware instant, normalized to UTC
pub type Timestamp = DateTime<Utc>;

/// Source of time for the engine
pub trait TimeSource {
    /// Current instant
    fn now(&self) -> Timestamp;

    /// Check if this source follows the wall clock (vs a controlled test clock)
    fn is_wall_clock(&self) -> bool;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn is_wall_clock(&self) -> bool {
        (**self).is_wall_clock()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn is_wall_clock(&self) -> bool {
        (**self).is_wall_clock()
    }
}

/// System wall clock in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing
///
/// Holds the instant in a `Cell` so a clock already moved into a store or
/// aggregator can still be advanced through a shared reference.
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: std::cell::Cell<Timestamp>,
}

impl FixedTime {
    /// Clock stopped at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: std::cell::Cell::new(timestamp),
        }
    }

    /// Start at an RFC 3339 instant
    pub fn at(rfc3339: &str) -> ValidationResult<Self> {
        parse_timestamp(rfc3339).map(Self::new)
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Move forward (or back, for a negative `delta`)
    pub fn advance(&self, delta: Duration) {
        self.timestamp.set(self.timestamp.get() + delta);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// Parse an RFC 3339 / ISO-8601 instant (a trailing `Z` is accepted)
pub fn parse_timestamp(input: &str) -> ValidationResult<Timestamp> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidTimestamp {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

/// Whole days elapsed from `earlier` to `later`, truncated toward zero
pub fn whole_days_between(earlier: Timestamp, later: Timestamp) -> i64 {
    (later - earlier).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let time = FixedTime::at("2024-03-01T12:00:00Z").unwrap();
        let start = time.now();

        time.advance(Duration::minutes(5));
        assert_eq!(time.now() - start, Duration::minutes(5));
        assert!(!time.is_wall_clock());
    }

    #[test]
    fn parses_offsets_into_utc() {
        let ts = parse_timestamp("2024-03-01T07:00:00-05:00").unwrap();
        assert_eq!(ts, parse_timestamp("2024-03-01T12:00:00Z").unwrap());
        assert_eq!(ts, parse_timestamp("2024-03-01T12:00:00+00:00").unwrap());
    }

    #[test]
    fn rejects_malformed_timestamps() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimestamp { .. }));
    }

    #[test]
    fn day_difference_truncates() {
        let now = parse_timestamp("2024-03-31T12:00:00Z").unwrap();
        let almost_31 = now - Duration::days(30) - Duration::hours(23);
        assert_eq!(whole_days_between(almost_31, now), 30);
        assert_eq!(whole_days_between(now - Duration::days(31), now), 31);
    }
}
