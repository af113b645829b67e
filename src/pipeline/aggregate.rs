// src/pipeline/aggregate.rs

//! Merging, ordering and gap-filling of lesson records.
//!
//! - `Aggregator`: merges per-day snapshots into one multi-day snapshot
//! - `sort_lessons`: deterministic ordering by period, class and start time
//! - `extract_day`: same-day view of a multi-day snapshot
//! - `infer_double_lessons`: fills missing periods inside a day's range

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::models::{LessonRecord, ScheduleSnapshot};
use crate::utils::time::shift_periods;

/// Sort value for a missing or non-numeric period or start time.
pub const SORT_LAST: u32 = 999;

/// Merges day-by-day snapshots into one range snapshot.
#[derive(Debug, Default)]
pub struct Aggregator {
    snapshot: ScheduleSnapshot,
    merged_days: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one successfully parsed day.
    ///
    /// Days must be merged in date order; the timestamp of the last merged
    /// day wins.
    pub fn merge_day(&mut self, date: NaiveDate, day: ScheduleSnapshot) {
        let ScheduleSnapshot {
            timestamp,
            lessons,
            changes,
            additional_info,
            classes,
            ..
        } = day;

        self.snapshot
            .lessons
            .extend(lessons.into_iter().map(|lesson| stamped(lesson, date)));
        self.snapshot
            .changes
            .extend(changes.into_iter().map(|lesson| stamped(lesson, date)));
        self.snapshot
            .additional_info
            .extend(additional_info.into_iter().map(|mut info| {
                info.date.get_or_insert(date);
                info
            }));
        for class_name in &classes {
            self.snapshot.add_class(class_name);
        }

        self.snapshot.day_timestamps.insert(date, timestamp.clone());
        self.snapshot.timestamp = timestamp;
        self.merged_days += 1;
    }

    /// Number of days merged so far.
    pub fn merged_days(&self) -> usize {
        self.merged_days
    }

    /// Finish merging and return the sorted range snapshot.
    pub fn finish(self) -> ScheduleSnapshot {
        let mut snapshot = self.snapshot;
        snapshot.lessons = sort_lessons(snapshot.lessons);
        snapshot.changes = sort_lessons(snapshot.changes);
        snapshot
    }
}

fn stamped(mut lesson: LessonRecord, date: NaiveDate) -> LessonRecord {
    lesson.stamp_date(date);
    lesson
}

/// Sort key: period, then class name, then start time in minutes.
pub fn lesson_sort_key(lesson: &LessonRecord) -> (u32, &str, u32) {
    (
        lesson.period_number().unwrap_or(SORT_LAST),
        lesson.class_name.as_str(),
        lesson.start_minutes().unwrap_or(SORT_LAST),
    )
}

/// Sort lessons deterministically. The sort is stable, so fully equal keys
/// keep their input order (e.g., the same period on different days).
pub fn sort_lessons(mut lessons: Vec<LessonRecord>) -> Vec<LessonRecord> {
    lessons.sort_by(|a, b| lesson_sort_key(a).cmp(&lesson_sort_key(b)));
    lessons
}

/// Same-day view of a range snapshot.
///
/// The timestamp is the day's own; a day that was not merged has none.
pub fn extract_day(snapshot: &ScheduleSnapshot, date: NaiveDate) -> ScheduleSnapshot {
    let timestamp = snapshot
        .day_timestamps
        .get(&date)
        .cloned()
        .unwrap_or_default();

    let on_day = |lesson: &&LessonRecord| lesson.date == Some(date);

    ScheduleSnapshot {
        date: Some(date),
        timestamp: timestamp.clone(),
        lessons: snapshot.lessons.iter().filter(on_day).cloned().collect(),
        changes: snapshot.changes.iter().filter(on_day).cloned().collect(),
        additional_info: snapshot
            .additional_info
            .iter()
            .filter(|info| info.date == Some(date))
            .cloned()
            .collect(),
        classes: snapshot.classes.clone(),
        day_timestamps: BTreeMap::from([(date, timestamp)]),
    }
}

/// Group lessons by their date; undated lessons are skipped.
pub fn group_by_date(lessons: &[LessonRecord]) -> BTreeMap<NaiveDate, Vec<LessonRecord>> {
    let mut days: BTreeMap<NaiveDate, Vec<LessonRecord>> = BTreeMap::new();
    for lesson in lessons {
        if let Some(date) = lesson.date {
            days.entry(date).or_default().push(lesson.clone());
        }
    }
    days
}

/// Fill missing periods of one day's lessons.
///
/// Only periods strictly between the smallest and largest numeric period are
/// considered. A missing period is filled only when the nearest lessons with a
/// subject on both sides share that subject, or when only one side has one.
/// It copies the nearer of them (the preceding one wins at equal distance),
/// with its times moved by one lesson length per period of distance. Lessons
/// from different classes are handled independently. The result is sorted.
pub fn infer_double_lessons(day_lessons: &[LessonRecord]) -> Vec<LessonRecord> {
    let mut by_class: BTreeMap<&str, BTreeMap<u32, &LessonRecord>> = BTreeMap::new();
    for lesson in day_lessons {
        if let Some(period) = lesson.period_number() {
            by_class
                .entry(lesson.class_name.as_str())
                .or_default()
                .entry(period)
                .or_insert(lesson);
        }
    }

    let mut result = day_lessons.to_vec();
    for periods in by_class.values() {
        let known: BTreeSet<u32> = periods.keys().copied().collect();
        let (Some(&min), Some(&max)) = (known.first(), known.last()) else {
            continue;
        };

        for missing in (min..=max).filter(|p| !known.contains(p)) {
            if let Some((source, distance)) = gap_source(periods, missing, min, max) {
                result.push(synthesize(source, missing, distance));
            }
        }
    }

    sort_lessons(result)
}

/// Source lesson for a missing period, and its signed distance to `target`
/// (positive if the source lies before the target).
///
/// The nearest subject-bearing lesson on each side bounds the gap. Two bounds
/// must agree on the subject; a single bound is used as is.
fn gap_source<'a>(
    periods: &BTreeMap<u32, &'a LessonRecord>,
    target: u32,
    min: u32,
    max: u32,
) -> Option<(&'a LessonRecord, i64)> {
    let with_subject = |period: u32| {
        periods
            .get(&period)
            .copied()
            .filter(|lesson| lesson.subject_str().is_some())
    };

    let before = (1..=target - min)
        .find_map(|distance| with_subject(target - distance).map(|l| (l, i64::from(distance))));
    let after = (1..=max - target)
        .find_map(|distance| with_subject(target + distance).map(|l| (l, -i64::from(distance))));

    match (before, after) {
        (Some(before), Some(after)) => {
            if before.0.subject_str() != after.0.subject_str() {
                return None;
            }
            if after.1.abs() < before.1 {
                Some(after)
            } else {
                Some(before)
            }
        }
        (before, after) => before.or(after),
    }
}

fn synthesize(source: &LessonRecord, period: u32, distance: i64) -> LessonRecord {
    let mut lesson = source.clone();
    lesson.period = Some(period.to_string());
    lesson.time_start = source
        .time_start
        .as_deref()
        .and_then(|t| shift_periods(t, distance));
    lesson.time_end = source
        .time_end
        .as_deref()
        .and_then(|t| shift_periods(t, distance));
    lesson.is_double_lesson_inferred = true;
    lesson.refresh_display_time();
    lesson
}
