//! Time source for fabricated timestamps.

use chrono::{DateTime, NaiveDateTime, Utc};

/// ISO-8601 without offset, microsecond precision (`2024-09-26T10:00:00.000000`).
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Compact form used inside fabricated instance identifiers.
pub const ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Source of "now" for the router and mock collaborators.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Build from a naive `YYYY-MM-DDTHH:MM:SS` string interpreted as UTC.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(|naive| Self(naive.and_utc()))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Render a timestamp the way every response body carries it.
pub fn iso(ts: DateTime<Utc>) -> String {
    ts.format(ISO_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_formats() {
        let clock = FixedClock::parse("2024-09-26T10:05:00").unwrap();
        assert_eq!(iso(clock.now()), "2024-09-26T10:05:00.000000");
        assert_eq!(clock.now().format(ID_FORMAT).to_string(), "20240926100500");
    }

    #[test]
    fn test_fixed_clock_rejects_garbage() {
        assert!(FixedClock::parse("yesterday").is_none());
    }
}
