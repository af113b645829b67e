// src/pipeline/views.rs

//! Read-only projections over a snapshot.
//!
//! - `next_lesson`: the first lesson starting after a given time
//! - `week_overview`: lessons grouped by school weekday with a summary
//! - `week_table`: per-day rows with inferred double lessons
//! - `calendar_events`: timed events for a date range
//!
//! Only the table projection runs double-lesson inference; the overview and
//! calendar show lessons exactly as published.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use serde::Serialize;

use crate::models::{LessonRecord, ScheduleSnapshot, weekday_name};
use crate::pipeline::aggregate::{group_by_date, infer_double_lessons, sort_lessons};
use crate::utils::time::{LESSON_MINUTES, parse_time};

const SCHOOL_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// First lesson whose start time lies strictly after `now`.
///
/// Lessons without a parseable start time are skipped.
pub fn next_lesson(lessons: &[LessonRecord], now: NaiveTime) -> Option<&LessonRecord> {
    lessons.iter().find(|lesson| {
        lesson
            .time_start
            .as_deref()
            .and_then(parse_time)
            .is_some_and(|start| start > now)
    })
}

/// Lessons of one school week grouped by weekday.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekOverview {
    /// Keys are "monday" .. "friday"; every school day is present
    pub lessons_by_day: BTreeMap<String, Vec<LessonRecord>>,
    pub summary: WeekSummary,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekSummary {
    pub total_lessons_week: usize,
    pub days_with_lessons: usize,
    /// Rounded to one decimal
    pub average_lessons_per_day: f64,
}

/// Group the snapshot's lessons by school weekday. Weekend lessons are dropped.
pub fn week_overview(snapshot: &ScheduleSnapshot) -> WeekOverview {
    let mut lessons_by_day: BTreeMap<String, Vec<LessonRecord>> = SCHOOL_DAYS
        .iter()
        .map(|day| (weekday_name(*day).to_string(), Vec::new()))
        .collect();

    for lesson in &snapshot.lessons {
        let Some(date) = lesson.date else {
            continue;
        };
        if let Some(day) = lessons_by_day.get_mut(weekday_name(date.weekday())) {
            day.push(lesson.clone());
        }
    }

    let total = lessons_by_day.values().map(Vec::len).sum::<usize>();
    let days_with_lessons = lessons_by_day.values().filter(|l| !l.is_empty()).count();
    let average = (total as f64 / SCHOOL_DAYS.len() as f64 * 10.0).round() / 10.0;

    WeekOverview {
        lessons_by_day,
        summary: WeekSummary {
            total_lessons_week: total,
            days_with_lessons,
            average_lessons_per_day: average,
        },
    }
}

/// One day of the week table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub lessons: Vec<LessonRecord>,
}

/// Per-day table rows with missing double-lesson periods filled in.
///
/// Regular lessons and changes share the table; a change replaces the regular
/// lesson of the same class and period.
pub fn week_table(snapshot: &ScheduleSnapshot) -> Vec<TableDay> {
    let mut merged: Vec<LessonRecord> = snapshot.changes.clone();
    for lesson in &snapshot.lessons {
        let replaced = snapshot.changes.iter().any(|change| {
            change.date == lesson.date
                && change.class_name == lesson.class_name
                && change.period.is_some()
                && change.period == lesson.period
        });
        if !replaced {
            merged.push(lesson.clone());
        }
    }

    group_by_date(&merged)
        .into_iter()
        .map(|(date, lessons)| TableDay {
            date,
            weekday: weekday_name(date.weekday()).to_string(),
            lessons: infer_double_lessons(&lessons),
        })
        .collect()
}

/// A timed calendar entry for one lesson.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarEvent {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub subject: String,
    pub teacher: Option<String>,
    pub room: Option<String>,
    pub period: Option<String>,
    pub info: Option<String>,
    pub is_change: bool,
}

/// Calendar events for school days between `from` and `to` (inclusive).
///
/// Lessons need a subject and a parseable start; a missing or unparseable end
/// defaults to one lesson length after the start.
pub fn calendar_events(
    snapshot: &ScheduleSnapshot,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<CalendarEvent> {
    let in_range = |lesson: &&LessonRecord| {
        lesson.date.is_some_and(|d| {
            d >= from && d <= to && SCHOOL_DAYS.contains(&d.weekday())
        })
    };

    let mut events: Vec<CalendarEvent> = sort_lessons(
        snapshot
            .lessons
            .iter()
            .chain(&snapshot.changes)
            .filter(in_range)
            .cloned()
            .collect(),
    )
    .iter()
    .filter_map(event_from_lesson)
    .collect();

    events.sort_by_key(|event| event.start);
    events
}

fn event_from_lesson(lesson: &LessonRecord) -> Option<CalendarEvent> {
    let date = lesson.date?;
    let subject = lesson.subject_str()?.to_string();
    let start = date.and_time(parse_time(lesson.time_start.as_deref()?)?);
    let end = lesson
        .time_end
        .as_deref()
        .and_then(parse_time)
        .map(|t| date.and_time(t))
        .filter(|end| *end > start)
        .unwrap_or(start + TimeDelta::minutes(LESSON_MINUTES));

    Some(CalendarEvent {
        start,
        end,
        subject,
        teacher: lesson.teacher.clone(),
        room: lesson.room.clone(),
        period: lesson.period.clone(),
        info: lesson.info.clone(),
        is_change: lesson.is_change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn lesson(day: u32, period: u32, subject: &str, start: &str, end: &str) -> LessonRecord {
        let mut lesson = LessonRecord {
            class_name: "5a".into(),
            period: Some(period.to_string()),
            time_start: (!start.is_empty()).then(|| start.to_string()),
            time_end: (!end.is_empty()).then(|| end.to_string()),
            subject: Some(subject.into()),
            ..Default::default()
        };
        lesson.stamp_date(date(day));
        lesson.refresh_display_time();
        lesson
    }

    #[test]
    fn test_next_lesson() {
        let lessons = vec![
            lesson(16, 1, "MA", "07:45", "08:30"),
            lesson(16, 2, "DE", "", ""),
            lesson(16, 3, "EN", "09:40", "10:25"),
        ];
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        assert_eq!(next_lesson(&lessons, at(7, 0)).unwrap().subject.as_deref(), Some("MA"));
        assert_eq!(next_lesson(&lessons, at(7, 45)).unwrap().subject.as_deref(), Some("EN"));
        assert!(next_lesson(&lessons, at(12, 0)).is_none());
        assert!(next_lesson(&[], at(7, 0)).is_none());
    }

    #[test]
    fn test_week_overview() {
        let snapshot = ScheduleSnapshot {
            lessons: vec![
                lesson(12, 1, "MA", "07:45", "08:30"),
                lesson(12, 2, "DE", "08:35", "09:20"),
                lesson(14, 1, "EN", "07:45", "08:30"),
                lesson(17, 1, "AG", "09:00", "10:00"),
            ],
            ..Default::default()
        };

        let overview = week_overview(&snapshot);
        assert_eq!(overview.lessons_by_day.len(), 5);
        assert_eq!(overview.lessons_by_day["monday"].len(), 2);
        assert!(overview.lessons_by_day["tuesday"].is_empty());
        assert_eq!(overview.lessons_by_day["wednesday"].len(), 1);
        assert_eq!(overview.summary.total_lessons_week, 3);
        assert_eq!(overview.summary.days_with_lessons, 2);
        assert_eq!(overview.summary.average_lessons_per_day, 0.6);
    }

    #[test]
    fn test_week_table_merges_changes() {
        let mut cancelled = lesson(12, 3, "MA", "09:40", "10:25");
        cancelled.is_change = true;
        cancelled.info = Some("fällt aus".into());

        let snapshot = ScheduleSnapshot {
            lessons: vec![
                lesson(12, 1, "DE", "07:45", "08:30"),
                lesson(12, 3, "PH", "09:40", "10:25"),
                lesson(13, 2, "EN", "08:35", "09:20"),
            ],
            changes: vec![cancelled],
            ..Default::default()
        };

        let table = week_table(&snapshot);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].date, date(12));
        assert_eq!(table[0].weekday, "monday");

        let monday: Vec<(&str, &str, bool)> = table[0]
            .lessons
            .iter()
            .map(|l| {
                (
                    l.period.as_deref().unwrap(),
                    l.subject.as_deref().unwrap(),
                    l.is_double_lesson_inferred,
                )
            })
            .collect();
        assert_eq!(monday, vec![("1", "DE", false), ("3", "MA", false)]);
        assert!(table[0].lessons[1].is_change);
        assert_eq!(table[1].lessons.len(), 1);
    }

    #[test]
    fn test_week_table_fills_same_subject_gap() {
        let snapshot = ScheduleSnapshot {
            lessons: vec![
                lesson(12, 1, "DE", "07:45", "08:30"),
                lesson(12, 3, "DE", "09:40", "10:25"),
                lesson(12, 5, "PH", "11:30", "12:15"),
            ],
            ..Default::default()
        };

        let table = week_table(&snapshot);
        let monday: Vec<(&str, bool)> = table[0]
            .lessons
            .iter()
            .map(|l| (l.period.as_deref().unwrap(), l.is_double_lesson_inferred))
            .collect();
        assert_eq!(
            monday,
            vec![("1", false), ("2", true), ("3", false), ("5", false)]
        );
    }

    #[test]
    fn test_plain_views_do_not_infer() {
        let snapshot = ScheduleSnapshot {
            lessons: vec![
                lesson(12, 1, "DE", "07:45", "08:30"),
                lesson(12, 3, "DE", "09:40", "10:25"),
            ],
            ..Default::default()
        };
        assert_eq!(week_overview(&snapshot).lessons_by_day["monday"].len(), 2);
        assert_eq!(calendar_events(&snapshot, date(12), date(18)).len(), 2);
        assert_eq!(week_table(&snapshot)[0].lessons.len(), 3);
    }

    #[test]
    fn test_calendar_events() {
        let mut change = lesson(13, 2, "BIO", "08:35", "");
        change.is_change = true;

        let snapshot = ScheduleSnapshot {
            lessons: vec![
                lesson(13, 1, "MA", "07:45", "08:30"),
                lesson(12, 4, "DE", "10:30", "11:15"),
                lesson(13, 3, "EN", "", ""),
                lesson(17, 1, "AG", "09:00", "10:00"),
                lesson(20, 1, "KU", "07:45", "08:30"),
            ],
            changes: vec![change],
            ..Default::default()
        };

        let events = calendar_events(&snapshot, date(12), date(18));
        let subjects: Vec<&str> = events.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["DE", "MA", "BIO"]);

        let bio = &events[2];
        assert!(bio.is_change);
        assert_eq!(bio.start, date(13).and_hms_opt(8, 35, 0).unwrap());
        assert_eq!(bio.end, date(13).and_hms_opt(9, 20, 0).unwrap());
    }
}
