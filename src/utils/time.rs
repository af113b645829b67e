//! Wall-clock helpers for `HH:MM` lesson times.

use chrono::{NaiveTime, TimeDelta, Timelike};

/// Length of one lesson period in minutes.
pub const LESSON_MINUTES: i64 = 45;

/// Parse `HH:MM` into a time of day.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Parse `HH:MM` into minutes since midnight.
pub fn parse_minutes(value: &str) -> Option<u32> {
    parse_time(value).map(|t| t.hour() * 60 + t.minute())
}

/// Shift an `HH:MM` string by whole lesson periods (negative moves earlier).
///
/// Returns `None` for unparseable input or if the result leaves the day.
pub fn shift_periods(value: &str, periods: i64) -> Option<String> {
    let time = parse_time(value)?;
    let delta = TimeDelta::minutes(LESSON_MINUTES * periods);
    let (shifted, wrapped) = time.overflowing_add_signed(delta);
    (wrapped == 0).then(|| shifted.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("07:45"), Some(465));
        assert_eq!(parse_minutes(" 08:05 "), Some(485));
        assert_eq!(parse_minutes("7.45"), None);
        assert_eq!(parse_minutes(""), None);
        assert_eq!(parse_minutes("25:00"), None);
    }

    #[test]
    fn test_shift_periods() {
        assert_eq!(shift_periods("07:45", 1).as_deref(), Some("08:30"));
        assert_eq!(shift_periods("08:30", -1).as_deref(), Some("07:45"));
        assert_eq!(shift_periods("07:45", 3).as_deref(), Some("10:00"));
        assert_eq!(shift_periods("23:30", 1), None);
        assert_eq!(shift_periods("soon", 1), None);
    }
}
