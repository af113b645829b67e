//! Subject discovery for a class.
//!
//! Scans plans around today and collects the subjects a class takes, so the
//! user can pick which ones to exclude.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

use crate::services::ScheduleFetcher;
use crate::services::client::ScheduleSource;

/// Days before today included in the scan.
pub const LOOKBACK_DAYS: u64 = 7;

/// Days scanned in total, starting `LOOKBACK_DAYS` before today.
pub const SCAN_DAYS: u32 = 28;

/// Prefixes of plan entries that are not real subjects.
const NON_SUBJECT_PREFIXES: [&str; 4] = ["KPL", "---", "Pause", "Mittagspause"];

/// Heuristic for "this looks like a real subject name".
///
/// Not a reliable classifier: keeps 2..=10 character names that are not
/// breaks, placeholders or free periods.
pub fn is_probable_subject(subject: &str) -> bool {
    let subject = subject.trim();
    let len = subject.chars().count();

    (2..=10).contains(&len)
        && !NON_SUBJECT_PREFIXES
            .iter()
            .any(|prefix| subject.starts_with(prefix))
        && !subject.to_lowercase().starts_with("frei")
}

/// Collect the subjects of `class_name` from lessons and changes around `today`.
///
/// Days without a plan are skipped; a rejected login yields no subjects.
pub async fn discover_subjects<S: ScheduleSource>(
    fetcher: &ScheduleFetcher<S>,
    class_name: &str,
    today: NaiveDate,
) -> BTreeSet<String> {
    let start = today
        .checked_sub_days(Days::new(LOOKBACK_DAYS))
        .unwrap_or(today);

    let snapshot = match fetcher.fetch_range(start, SCAN_DAYS, Some(class_name)).await {
        Ok(outcome) => outcome.snapshot,
        Err(e) => {
            log::error!("Subject discovery for {class_name} failed: {e}");
            return BTreeSet::new();
        }
    };

    let subjects: BTreeSet<String> = snapshot
        .lessons
        .iter()
        .chain(&snapshot.changes)
        .filter_map(|lesson| lesson.subject_str())
        .map(str::trim)
        .filter(|subject| is_probable_subject(subject))
        .map(str::to_string)
        .collect();

    log::info!("Found {} subjects for class {}", subjects.len(), class_name);
    subjects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetcher::testing::{FakeSource, day_plan};

    #[test]
    fn test_is_probable_subject() {
        assert!(is_probable_subject("MA"));
        assert!(is_probable_subject(" DE "));
        assert!(is_probable_subject("Informatik"));

        assert!(!is_probable_subject("M"));
        assert!(!is_probable_subject("Wirtschaftslehre"));
        assert!(!is_probable_subject("KPL1"));
        assert!(!is_probable_subject("---"));
        assert!(!is_probable_subject("Pause"));
        assert!(!is_probable_subject("Mittagspause"));
        assert!(!is_probable_subject("Frei"));
        assert!(!is_probable_subject("freistunde"));
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(is_probable_subject("Ästhetik"));
        assert!(!is_probable_subject("Ä"));
    }

    #[tokio::test]
    async fn discover_collects_lessons_and_changes() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let source = FakeSource::default()
            .with_day(
                NaiveDate::from_ymd_opt(2026, 10, 9).unwrap(),
                day_plan("a", "MA", "---"),
            )
            .with_day(today, day_plan("b", "DE", "EN"))
            .with_day(
                NaiveDate::from_ymd_opt(2026, 11, 5).unwrap(),
                day_plan("c", "MA", "Pause"),
            )
            .with_day(
                NaiveDate::from_ymd_opt(2026, 11, 6).unwrap(),
                day_plan("d", "KU", "MU"),
            );
        let fetcher = ScheduleFetcher::new(source, 4);

        let subjects = discover_subjects(&fetcher, "5a", today).await;
        let subjects: Vec<&str> = subjects.iter().map(String::as_str).collect();
        assert_eq!(subjects, vec!["DE", "EN", "MA"]);
        assert_eq!(fetcher.source().requested.lock().unwrap().len(), 28);
    }
}
