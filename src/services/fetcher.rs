// src/services/fetcher.rs

//! Schedule fetcher service.
//!
//! Retrieves day plans from a `ScheduleSource`, parses them and merges the
//! successful days. A missing or broken day never aborts the batch.

use chrono::{Days, NaiveDate};
use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::ScheduleSnapshot;
use crate::pipeline::aggregate::Aggregator;
use crate::services::client::ScheduleSource;
use crate::services::parser::{parse_class_list, parse_day};

/// Summary of a range fetch.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub snapshot: ScheduleSnapshot,
    pub day_total: usize,
    pub day_failures: usize,
}

/// Service for fetching day plans over a schedule source.
pub struct ScheduleFetcher<S> {
    source: S,
    max_concurrent: usize,
}

impl<S: ScheduleSource> ScheduleFetcher<S> {
    /// Create a fetcher that runs up to `max_concurrent` day requests at once.
    pub fn new(source: S, max_concurrent: usize) -> Self {
        Self {
            source,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and parse a single day.
    pub async fn fetch_day(
        &self,
        date: NaiveDate,
        class_name: Option<&str>,
    ) -> Result<ScheduleSnapshot> {
        let xml = self.source.fetch_day_document(date).await?;
        parse_day(&xml, date, class_name)
    }

    /// Fetch `days` consecutive days starting at `start`.
    ///
    /// Days that fail (no plan published, timeout, broken XML) are left out.
    /// Only a rejected login is reported as an error.
    pub async fn fetch_range(
        &self,
        start: NaiveDate,
        days: u32,
        class_name: Option<&str>,
    ) -> Result<FetchOutcome> {
        let dates: Vec<NaiveDate> = (0..days)
            .filter_map(|offset| start.checked_add_days(Days::new(u64::from(offset))))
            .collect();

        let mut outcome = FetchOutcome {
            day_total: dates.len(),
            ..FetchOutcome::default()
        };

        // `buffered` keeps date order, so the last merged timestamp is the latest day's.
        let mut results = stream::iter(dates)
            .map(|date| async move { (date, self.fetch_day(date, class_name).await) })
            .buffered(self.max_concurrent);

        let mut aggregator = Aggregator::new();
        let mut systemic: Option<AppError> = None;

        while let Some((date, result)) = results.next().await {
            match result {
                Ok(day) => aggregator.merge_day(date, day),
                Err(e) if e.is_systemic() => {
                    outcome.day_failures += 1;
                    log::error!("Schedule source rejected request for {date}: {e}");
                    if systemic.is_none() {
                        systemic = Some(e);
                    }
                }
                Err(AppError::Xml(e)) => {
                    outcome.day_failures += 1;
                    log::warn!("Skipping {date}: plan is not valid XML ({e})");
                }
                Err(AppError::Status { status, .. }) => {
                    outcome.day_failures += 1;
                    log::info!("No plan published for {date} (HTTP {status})");
                }
                Err(e) => {
                    outcome.day_failures += 1;
                    log::warn!("Skipping {date}: {e}");
                }
            }
        }

        if let Some(e) = systemic {
            return Err(e);
        }

        log::info!(
            "Fetched {}/{} days starting {}",
            aggregator.merged_days(),
            outcome.day_total,
            start
        );
        outcome.snapshot = aggregator.finish();
        Ok(outcome)
    }

    /// Fetch the list of known class short names.
    pub async fn fetch_classes(&self) -> Result<Vec<String>> {
        let xml = self.source.fetch_class_list().await?;
        parse_class_list(&xml)
    }

    /// Check that the source is reachable with the configured credentials.
    pub async fn test_connection(&self) -> Result<bool> {
        self.source.test_connection().await
    }
}
