//! Diff between the change lists of two consecutive refreshes.
//!
//! Used by the watch loop to report substitutions that were newly published,
//! edited, or withdrawn since the previous cycle.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{LessonRecord, RefreshOutcome, RefreshStatus};

/// Identity of a change across refreshes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeKey {
    pub date: Option<NaiveDate>,
    pub class_name: String,
    pub period: Option<String>,
    pub course: Option<String>,
    pub time_start: Option<String>,
}

impl From<&LessonRecord> for ChangeKey {
    fn from(lesson: &LessonRecord) -> Self {
        Self {
            date: lesson.date,
            class_name: lesson.class_name.clone(),
            period: lesson.period.clone(),
            course: lesson.course.clone(),
            time_start: lesson.time_start.clone(),
        }
    }
}

/// Changes added, updated and removed between two refreshes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChangeDiff {
    pub added: Vec<LessonRecord>,
    pub updated: Vec<LessonRecord>,
    pub removed: Vec<LessonRecord>,
}

impl ChangeDiff {
    /// Compare previous and current change lists.
    pub fn between(previous: &[LessonRecord], current: &[LessonRecord]) -> Self {
        let prev_map: BTreeMap<ChangeKey, &LessonRecord> =
            previous.iter().map(|c| (ChangeKey::from(c), c)).collect();
        let curr_map: BTreeMap<ChangeKey, &LessonRecord> =
            current.iter().map(|c| (ChangeKey::from(c), c)).collect();

        let prev_keys: BTreeSet<&ChangeKey> = prev_map.keys().collect();
        let curr_keys: BTreeSet<&ChangeKey> = curr_map.keys().collect();

        let added = curr_keys
            .difference(&prev_keys)
            .filter_map(|key| curr_map.get(*key).copied().cloned())
            .collect();

        let removed = prev_keys
            .difference(&curr_keys)
            .filter_map(|key| prev_map.get(*key).copied().cloned())
            .collect();

        let updated = curr_keys
            .intersection(&prev_keys)
            .filter_map(|key| match (prev_map.get(*key), curr_map.get(*key)) {
                (Some(prev), Some(curr)) if content_differs(prev, curr) => Some((*curr).clone()),
                _ => None,
            })
            .collect();

        Self {
            added,
            updated,
            removed,
        }
    }

    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty() || !self.removed.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

/// Remembers the change list of the last fresh refresh.
///
/// Degraded refreshes carry no data and are not compared or remembered, so an
/// outage does not make every change look new afterwards.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    previous: Option<Vec<LessonRecord>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the outcome's week changes against the last fresh refresh.
    ///
    /// Returns `None` for the first fresh refresh and for degraded ones.
    pub fn observe(&mut self, outcome: &RefreshOutcome) -> Option<ChangeDiff> {
        if let RefreshStatus::Degraded { reason } = &outcome.status {
            log::debug!("Keeping previous changes, refresh degraded: {reason}");
            return None;
        }

        let current = outcome.week.changes.clone();
        let diff = self
            .previous
            .as_deref()
            .map(|previous| ChangeDiff::between(previous, &current));
        self.previous = Some(current);
        diff
    }
}

fn content_differs(prev: &LessonRecord, curr: &LessonRecord) -> bool {
    prev.subject != curr.subject
        || prev.teacher != curr.teacher
        || prev.room != curr.room
        || prev.info != curr.info
}
