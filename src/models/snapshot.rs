//! Snapshot produced by one fetch-and-parse cycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{AdditionalInfoRecord, LessonRecord};

/// Normalized result of one fetch cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScheduleSnapshot {
    /// Target day, when the snapshot describes a single day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Freshness marker reported by the source (empty if absent)
    pub timestamp: String,

    /// Regular lessons
    pub lessons: Vec<LessonRecord>,

    /// Lessons that differ from the planned timetable
    pub changes: Vec<LessonRecord>,

    /// Day-level notices
    pub additional_info: Vec<AdditionalInfoRecord>,

    /// Known class short names, in first-seen order
    pub classes: Vec<String>,

    /// Freshness marker of each merged day
    #[serde(skip)]
    pub day_timestamps: BTreeMap<NaiveDate, String>,
}

impl ScheduleSnapshot {
    /// An empty snapshot for the given day ("no schedule published").
    pub fn empty(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    /// True if the snapshot carries no lessons, changes or notices.
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty() && self.changes.is_empty() && self.additional_info.is_empty()
    }

    /// Record a class name unless it is already known.
    pub fn add_class(&mut self, class_name: &str) {
        if !self.classes.iter().any(|c| c == class_name) {
            self.classes.push(class_name.to_string());
        }
    }
}

/// Whether a refresh produced live data or fell back to an empty state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RefreshStatus {
    Fresh,
    Degraded { reason: String },
}

/// Weekly lessons and changes, serialized as `week_lessons` / `week_changes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WeekData {
    pub week_lessons: Vec<LessonRecord>,
    pub week_changes: Vec<LessonRecord>,
}

impl From<&ScheduleSnapshot> for WeekData {
    fn from(snapshot: &ScheduleSnapshot) -> Self {
        Self {
            week_lessons: snapshot.lessons.clone(),
            week_changes: snapshot.changes.clone(),
        }
    }
}

/// Everything one refresh cycle hands to its consumers.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    /// Today's lessons, exclusion filter applied
    #[serde(flatten)]
    pub today: ScheduleSnapshot,

    /// Week range, exclusion filter applied
    #[serde(skip)]
    pub week: ScheduleSnapshot,

    /// Week range before the exclusion filter
    #[serde(skip)]
    pub unfiltered_week: ScheduleSnapshot,

    /// When this refresh ran
    pub last_updated: DateTime<Local>,

    pub status: RefreshStatus,
}

impl RefreshOutcome {
    /// Week lessons/changes in the outbound shape.
    pub fn week_data(&self) -> WeekData {
        WeekData::from(&self.week)
    }

    /// Serialize the outbound view: today's snapshot plus `week_lessons` / `week_changes`.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let serde_json::Value::Object(map) = &mut value {
            if let serde_json::Value::Object(week) = serde_json::to_value(self.week_data())? {
                map.extend(week);
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_class_deduplicates() {
        let mut snapshot = ScheduleSnapshot::default();
        snapshot.add_class("5a");
        snapshot.add_class("5b");
        snapshot.add_class("5a");
        assert_eq!(snapshot.classes, vec!["5a", "5b"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16);
        let snapshot = ScheduleSnapshot::empty(date);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.timestamp, "");
        assert_eq!(snapshot.date, date);
    }

    #[test]
    fn test_outcome_json_shape() {
        let week = ScheduleSnapshot {
            lessons: vec![LessonRecord {
                class_name: "5a".into(),
                subject: Some("MA".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let outcome = RefreshOutcome {
            today: ScheduleSnapshot::empty(NaiveDate::from_ymd_opt(2026, 10, 16)),
            week: week.clone(),
            unfiltered_week: week,
            last_updated: Local::now(),
            status: RefreshStatus::Fresh,
        };

        let json = outcome.to_json().unwrap();
        assert_eq!(json["date"], "2026-10-16");
        assert_eq!(json["week_lessons"][0]["subject"], "MA");
        assert!(json["week_changes"].as_array().unwrap().is_empty());
        assert_eq!(json["status"]["state"], "fresh");
    }
}
