// src/pipeline/filter.rs

//! Subject exclusion filter.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{LessonRecord, ScheduleSnapshot};

/// Subjects the user does not take; their lessons and changes are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    subjects: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subjects: subjects.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Whether a lesson's subject is excluded. Lessons without a subject never are.
    pub fn excludes(&self, lesson: &LessonRecord) -> bool {
        lesson
            .subject
            .as_deref()
            .is_some_and(|subject| self.subjects.contains(subject))
    }
}

/// Return a copy of `snapshot` without lessons/changes of excluded subjects.
///
/// Order is preserved; additional info and all other fields pass through.
pub fn filter_snapshot(snapshot: &ScheduleSnapshot, exclusions: &ExclusionSet) -> ScheduleSnapshot {
    if exclusions.is_empty() {
        return snapshot.clone();
    }

    let keep = |lessons: &[LessonRecord]| -> Vec<LessonRecord> {
        lessons
            .iter()
            .filter(|lesson| !exclusions.excludes(lesson))
            .cloned()
            .collect()
    };

    let filtered = ScheduleSnapshot {
        lessons: keep(&snapshot.lessons),
        changes: keep(&snapshot.changes),
        ..snapshot.clone()
    };

    log::debug!(
        "Subject filter removed {} lessons and {} changes",
        snapshot.lessons.len() - filtered.lessons.len(),
        snapshot.changes.len() - filtered.changes.len()
    );

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdditionalInfoRecord;

    fn lesson(period: &str, subject: Option<&str>) -> LessonRecord {
        LessonRecord {
            class_name: "5a".into(),
            period: Some(period.into()),
            subject: subject.map(str::to_string),
            ..Default::default()
        }
    }

    fn snapshot() -> ScheduleSnapshot {
        ScheduleSnapshot {
            timestamp: "16.10.2026, 06:45".into(),
            lessons: vec![
                lesson("1", Some("MA")),
                lesson("2", Some("REL")),
                lesson("3", None),
                lesson("4", Some("ETH")),
                lesson("5", Some("DE")),
            ],
            changes: vec![lesson("2", Some("REL")), lesson("6", Some("SP"))],
            additional_info: vec![AdditionalInfoRecord {
                date: None,
                text: "REL entfällt in der 2. Stunde".into(),
            }],
            classes: vec!["5a".into()],
            ..Default::default()
        }
    }

    fn periods(lessons: &[LessonRecord]) -> Vec<&str> {
        lessons.iter().filter_map(|l| l.period.as_deref()).collect()
    }

    #[test]
    fn test_removes_exactly_excluded_subjects() {
        let input = snapshot();
        let filtered = filter_snapshot(&input, &ExclusionSet::new(["REL", "ETH"]));

        assert_eq!(periods(&filtered.lessons), vec!["1", "3", "5"]);
        assert_eq!(periods(&filtered.changes), vec!["6"]);
        assert_eq!(filtered.additional_info, input.additional_info);
        assert_eq!(filtered.timestamp, input.timestamp);
        assert_eq!(filtered.classes, input.classes);
    }

    #[test]
    fn test_empty_exclusions_is_identity() {
        let input = snapshot();
        assert_eq!(filter_snapshot(&input, &ExclusionSet::default()), input);
    }

    #[test]
    fn test_unknown_subjects_is_identity() {
        let input = snapshot();
        assert_eq!(filter_snapshot(&input, &ExclusionSet::new(["PH"])), input);
    }

    #[test]
    fn test_input_not_mutated() {
        let input = snapshot();
        let before = input.clone();
        let _ = filter_snapshot(&input, &ExclusionSet::new(["MA"]));
        assert_eq!(input, before);
    }

    #[test]
    fn test_matching_is_exact() {
        let filtered = filter_snapshot(&snapshot(), &ExclusionSet::new(["ma", "RE"]));
        assert_eq!(filtered.lessons.len(), 5);
    }
}
