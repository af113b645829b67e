// src/pipeline/refresh.rs

//! One refresh cycle.

use chrono::{Datelike, Days, Local, NaiveDate};

use crate::models::{Config, RefreshOutcome, RefreshStatus, ScheduleSnapshot};
use crate::pipeline::aggregate::extract_day;
use crate::pipeline::filter::{ExclusionSet, filter_snapshot};
use crate::services::ScheduleFetcher;
use crate::services::client::ScheduleSource;

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(date)
}

/// Run one refresh: fetch the current week, derive today, apply exclusions.
///
/// Never fails; a systemic source failure produces empty snapshots with a
/// degraded status so consumers show "no data" instead of breaking.
pub async fn run_refresh<S: ScheduleSource>(
    fetcher: &ScheduleFetcher<S>,
    config: &Config,
    today: NaiveDate,
) -> RefreshOutcome {
    let start = week_start(today);
    let class_name = config.school.class_name.as_deref();
    let exclusions = ExclusionSet::new(config.school.excluded_subjects.iter().cloned());

    let (unfiltered_week, status) =
        match fetcher.fetch_range(start, config.refresh.days, class_name).await {
            Ok(outcome) => {
                if outcome.day_failures > 0 {
                    log::info!(
                        "{} of {} days had no usable plan",
                        outcome.day_failures,
                        outcome.day_total
                    );
                }
                (outcome.snapshot, RefreshStatus::Fresh)
            }
            Err(e) => {
                log::error!("Refresh failed, serving empty schedule: {e}");
                (
                    ScheduleSnapshot::empty(None),
                    RefreshStatus::Degraded {
                        reason: e.to_string(),
                    },
                )
            }
        };

    let week = filter_snapshot(&unfiltered_week, &exclusions);
    let today_snapshot = extract_day(&week, today);

    log::info!(
        "Refresh for {}: {} lessons and {} changes today, {} lessons this week",
        today,
        today_snapshot.lessons.len(),
        today_snapshot.changes.len(),
        week.lessons.len()
    );

    RefreshOutcome {
        today: today_snapshot,
        week,
        unfiltered_week,
        last_updated: Local::now(),
        status,
    }
}
