//! Time and timestamp utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Length of a month for visit frequency, in milliseconds (30 days)
pub const MILLIS_PER_MONTH: i64 = 30 * 24 * 60 * 60 * 1000;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get current Unix timestamp in milliseconds
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Next write timestamp for an entity whose newest event is at `last`.
///
/// Falls back to `last + 1` when the clock has not moved past it, so
/// timestamps within one entity's log stay strictly increasing.
pub fn next_recorded_at(now: i64, last: Option<i64>) -> i64 {
    match last {
        Some(last) if now <= last => last.saturating_add(1),
        _ => now,
    }
}

/// Months elapsed between two timestamps; 1 when they are equal
pub fn elapsed_months(first: i64, last: i64) -> f64 {
    if last <= first {
        return 1.0;
    }
    (last - first) as f64 / MILLIS_PER_MONTH as f64
}

/// UTC calendar date (YYYY-MM-DD) of a millisecond timestamp
pub fn date_of_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .format(DATE_FORMAT)
        .to_string()
}

/// Check a YYYY-MM-DD calendar date
pub fn is_calendar_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_recorded_at_is_monotonic() {
        assert_eq!(next_recorded_at(1000, None), 1000);
        assert_eq!(next_recorded_at(1000, Some(500)), 1000);
        // clock skew: now is behind the last event
        assert_eq!(next_recorded_at(1000, Some(2000)), 2001);
        assert_eq!(next_recorded_at(1000, Some(1000)), 1001);
    }

    #[test]
    fn test_elapsed_months() {
        assert_eq!(elapsed_months(5, 5), 1.0);
        assert_eq!(elapsed_months(0, MILLIS_PER_MONTH * 3), 3.0);
        assert_eq!(elapsed_months(0, MILLIS_PER_MONTH / 2), 0.5);
    }

    #[test]
    fn test_date_of_millis() {
        assert_eq!(date_of_millis(0), "1970-01-01");
        assert_eq!(date_of_millis(1_709_251_199_000), "2024-02-29");
    }

    #[test]
    fn test_is_calendar_date() {
        assert!(is_calendar_date("2024-02-29"));
        assert!(!is_calendar_date("2023-02-29"));
        assert!(!is_calendar_date("2024-13-01"));
        assert!(!is_calendar_date("yesterday"));
    }
}
