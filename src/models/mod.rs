// src/models/mod.rs

//! Domain models for the schedule pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod lesson;
mod snapshot;

// Re-export all public types
pub use config::{ClientConfig, Config, LoggingConfig, RefreshConfig, SchoolConfig};
pub use lesson::{AdditionalInfoRecord, LessonRecord, display_time, weekday_name};
pub use snapshot::{RefreshOutcome, RefreshStatus, ScheduleSnapshot, WeekData};
