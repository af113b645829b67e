//! Service layer for the schedule pipeline.
//!
//! This module contains the business logic for:
//! - Talking to stundenplan24 (`Stundenplan24Client` behind `ScheduleSource`)
//! - Parsing day plans and class lists (`parser`)
//! - Fetching day ranges concurrently (`ScheduleFetcher`)
//! - Subject discovery for the exclusion picker (`discovery`)

pub mod client;
pub mod discovery;
pub mod fetcher;
pub mod parser;

pub use client::{ScheduleSource, Stundenplan24Client};
pub use discovery::{discover_subjects, is_probable_subject};
pub use fetcher::{FetchOutcome, ScheduleFetcher};
