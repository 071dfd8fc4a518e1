// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time arithmetic and formatting.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Length of a "month" when turning the lookback setting into a duration.
pub const DAYS_PER_MONTH: f64 = 30.0;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a UTC timestamp without dropping sub-second digits.
///
/// Used for the checkpoint, which must read back as exactly the instant
/// that was written.
pub fn format_utc_rfc3339_exact(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an RFC3339 timestamp into UTC.
pub fn parse_utc_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert a (possibly fractional) month count into a duration.
pub fn months_to_duration(months: f64) -> Duration {
    let secs = (months * DAYS_PER_MONTH * SECS_PER_DAY as f64).round() as i64;
    Duration::seconds(secs)
}

/// Whole days from `earlier` to `later`, rounded up. Zero if not later.
pub fn days_between_ceil(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let millis = (later - earlier).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    let day_millis = SECS_PER_DAY * 1000;
    (millis + day_millis - 1) / day_millis
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_days_between_exact() {
        assert_eq!(days_between_ceil(at(10, 0), at(15, 0)), 5);
    }

    #[test]
    fn test_days_between_rounds_up() {
        assert_eq!(days_between_ceil(at(10, 0), at(10, 1)), 1);
        assert_eq!(days_between_ceil(at(10, 0), at(15, 1)), 6);
    }

    #[test]
    fn test_days_between_not_later() {
        assert_eq!(days_between_ceil(at(10, 0), at(10, 0)), 0);
        assert_eq!(days_between_ceil(at(15, 0), at(10, 0)), 0);
    }

    #[test]
    fn test_half_month() {
        assert_eq!(months_to_duration(0.5), Duration::days(15));
        assert_eq!(months_to_duration(1.0), Duration::days(30));
    }

    #[test]
    fn test_rfc3339_round_trip_keeps_millis() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
            + Duration::milliseconds(123);
        let text = format_utc_rfc3339(ts);
        assert_eq!(text, "2024-01-15T10:30:00.123Z");
        assert_eq!(parse_utc_rfc3339(&text), Some(ts));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_utc_rfc3339("yesterday"), None);
    }
}
