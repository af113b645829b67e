//! Lesson and notice records.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::utils::time::parse_minutes;

/// One scheduled or changed teaching period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LessonRecord {
    /// Calendar day the lesson belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Lowercase English weekday name of `date` (e.g., "monday")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<String>,

    /// Class short name (e.g., "5a")
    #[serde(rename = "class")]
    pub class_name: String,

    /// Period as published; usually numeric
    pub period: Option<String>,

    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub subject: Option<String>,
    pub teacher: Option<String>,
    pub room: Option<String>,

    /// Course group qualifier
    pub course: Option<String>,

    /// Free-text annotation from the substitution plan
    pub info: Option<String>,

    /// Display string: "08:00-08:45", "08:00" or "3. period"
    pub time: String,

    pub is_change: bool,

    /// Set only for periods synthesized by double-lesson inference
    #[serde(default)]
    pub is_double_lesson_inferred: bool,
}

impl LessonRecord {
    /// Numeric period ordinal, if the period is a number.
    pub fn period_number(&self) -> Option<u32> {
        self.period.as_deref().and_then(|p| p.trim().parse().ok())
    }

    /// Start time as minutes since midnight, if parseable.
    pub fn start_minutes(&self) -> Option<u32> {
        self.time_start.as_deref().and_then(parse_minutes)
    }

    /// Subject, treating empty strings as absent.
    pub fn subject_str(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Rebuild the display `time` string from the current fields.
    pub fn refresh_display_time(&mut self) {
        self.time = display_time(
            self.time_start.as_deref(),
            self.time_end.as_deref(),
            self.period.as_deref(),
        );
    }

    /// Stamp the date and weekday name unless already present.
    pub fn stamp_date(&mut self, date: NaiveDate) {
        let date = *self.date.get_or_insert(date);
        if self.weekday.is_none() {
            self.weekday = Some(weekday_name(date.weekday()).to_string());
        }
    }
}

/// A day-level free-text notice (not tied to a lesson or subject).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdditionalInfoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub text: String,
}

/// Build the display time for a lesson.
pub fn display_time(start: Option<&str>, end: Option<&str>, period: Option<&str>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!("{start}-{end}"),
        (Some(start), None) => start.to_string(),
        _ => format!("{}. period", period.unwrap_or("")),
    }
}

/// Lowercase English name of a weekday.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_time() {
        assert_eq!(display_time(Some("07:45"), Some("08:30"), Some("1")), "07:45-08:30");
        assert_eq!(display_time(Some("07:45"), None, Some("1")), "07:45");
        assert_eq!(display_time(None, Some("08:30"), Some("3")), "3. period");
        assert_eq!(display_time(None, None, None), ". period");
    }

    #[test]
    fn test_period_number() {
        let mut lesson = LessonRecord {
            period: Some("3".into()),
            ..Default::default()
        };
        assert_eq!(lesson.period_number(), Some(3));

        lesson.period = Some("x".into());
        assert_eq!(lesson.period_number(), None);

        lesson.period = None;
        assert_eq!(lesson.period_number(), None);
    }

    #[test]
    fn test_stamp_date_keeps_existing() {
        let original = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let mut lesson = LessonRecord {
            date: Some(original),
            ..Default::default()
        };
        lesson.stamp_date(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());

        assert_eq!(lesson.date, Some(original));
        assert_eq!(lesson.weekday.as_deref(), Some("monday"));
    }

    #[test]
    fn test_serialized_field_names() {
        let lesson = LessonRecord {
            class_name: "5a".into(),
            subject: Some("MA".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&lesson).unwrap();
        assert_eq!(json["class"], "5a");
        assert_eq!(json["subject"], "MA");
        assert_eq!(json["is_double_lesson_inferred"], false);
        assert!(json.get("date").is_none());
    }
}
