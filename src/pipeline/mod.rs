//! Normalization pipeline.
//!
//! - `aggregate`: merge per-day snapshots, sort, infer double lessons
//! - `filter`: drop excluded subjects
//! - `views`: next lesson, week overview, week table, calendar events
//! - `diff`: compare change lists of consecutive refreshes
//! - `refresh`: one complete refresh cycle

pub mod aggregate;
pub mod diff;
pub mod filter;
pub mod refresh;
pub mod views;

pub use aggregate::{Aggregator, extract_day, infer_double_lessons, sort_lessons};
pub use diff::{ChangeDiff, ChangeTracker};
pub use filter::{ExclusionSet, filter_snapshot};
pub use refresh::{run_refresh, week_start};
