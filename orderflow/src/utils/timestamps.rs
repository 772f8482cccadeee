//! Timestamp helpers shared across the crate.
//!
//! All persisted and emitted timestamps are UTC. Stage durations are
//! reported in whole seconds, truncated.

use chrono::{DateTime, Utc};

/// The timestamp type used throughout the crate.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Returns the current UTC time as an ISO 8601 formatted string:
/// `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`.
#[must_use]
pub fn iso_timestamp() -> String {
    format_iso8601(&Utc::now())
}

/// Formats a timestamp as an ISO 8601 string.
#[must_use]
pub fn format_iso8601(dt: &Timestamp) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Returns the number of whole seconds between two timestamps, truncated.
#[must_use]
pub fn whole_seconds_between(start: Timestamp, end: Timestamp) -> i64 {
    end.signed_duration_since(start).num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_whole_seconds_truncates() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let end = start + chrono::Duration::milliseconds(90_700);
        assert_eq!(whole_seconds_between(start, end), 90);
    }

    #[test]
    fn test_whole_seconds_zero() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(whole_seconds_between(start, start), 0);
    }

    #[test]
    fn test_format_iso8601() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        assert_eq!(format_iso8601(&dt), "2024-05-01T12:30:45.000000+00:00");
    }
}
