//! vplan CLI
//!
//! Fetches stundenplan24 plans and prints them as JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tokio::time::MissedTickBehavior;
use vplan::{
    error::{AppError, Result},
    models::{Config, RefreshOutcome},
    pipeline::{self, ChangeDiff, ChangeTracker, ExclusionSet},
    services::{self, ScheduleFetcher, Stundenplan24Client},
};

/// vplan - stundenplan24 timetable fetcher
#[derive(Parser, Debug)]
#[command(
    name = "vplan",
    version,
    about = "Timetables and substitution plans from stundenplan24"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "vplan.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Class to show, overrides `school.class_name`
    #[arg(long)]
    class: Option<String>,

    /// Subject to exclude, may be repeated; replaces `school.excluded_subjects`
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one refresh, or fetch a date range with --date
    Fetch {
        /// First day to fetch (YYYY-MM-DD); without it, today's week is refreshed
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Number of days to fetch starting at --date
        #[arg(long, default_value_t = 1)]
        days: u32,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Refresh periodically and report changed substitutions
    Watch {
        /// Rewrite this file with the latest JSON after every refresh
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the classes of the school
    Classes,

    /// List the subjects of the selected class
    Subjects,

    /// Check that stundenplan24 accepts the credentials
    Check,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging; `--verbose` wins over the configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Write JSON to a file, or to stdout when no path is given.
fn emit(json: &serde_json::Value, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(json)?;
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            log::info!("Saved to {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Write the outcome JSON to `path`.
fn save_outcome(outcome: &RefreshOutcome, path: &Path) -> Result<()> {
    emit(&outcome.to_json()?, Some(path))
}

fn report_diff(diff: &ChangeDiff) {
    if !diff.has_changes() {
        return;
    }

    log::info!(
        "{} substitution updates: {} new, {} updated, {} withdrawn",
        diff.change_count(),
        diff.added.len(),
        diff.updated.len(),
        diff.removed.len()
    );
    for change in &diff.added {
        log::info!(
            "New: {} {} {}",
            change.class_name,
            change.time,
            change.subject_str().unwrap_or("-")
        );
    }
}

fn build_fetcher(config: &Config) -> Result<ScheduleFetcher<Stundenplan24Client>> {
    let client = Stundenplan24Client::new(&config.school, &config.client)?;
    Ok(ScheduleFetcher::new(client, config.client.max_concurrent))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    init_logging(cli.verbose, &config.logging.level);

    match loaded {
        Ok(_) => log::info!("Loaded configuration from {}", cli.config.display()),
        Err(e) => log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        ),
    }

    if let Some(class_name) = cli.class {
        config.school.class_name = Some(class_name);
    }
    if !cli.exclude.is_empty() {
        config.school.excluded_subjects = cli.exclude;
    }

    match cli.command {
        Command::Fetch { date, days, output } => {
            let fetcher = build_fetcher(&config)?;

            let json = match date {
                Some(start) => {
                    let outcome = fetcher
                        .fetch_range(start, days, config.school.class_name.as_deref())
                        .await?;
                    let exclusions =
                        ExclusionSet::new(config.school.excluded_subjects.iter().cloned());
                    let snapshot = pipeline::filter_snapshot(&outcome.snapshot, &exclusions);
                    log::info!(
                        "{} lessons and {} changes in {} days ({} without plan)",
                        snapshot.lessons.len(),
                        snapshot.changes.len(),
                        outcome.day_total,
                        outcome.day_failures
                    );
                    serde_json::to_value(&snapshot)?
                }
                None => {
                    let outcome =
                        pipeline::run_refresh(&fetcher, &config, Local::now().date_naive()).await;
                    outcome.to_json()?
                }
            };

            emit(&json, output.as_deref())?;
        }

        Command::Watch { output } => {
            let fetcher = build_fetcher(&config)?;
            let period = Duration::from_secs(config.refresh.interval_minutes.max(1) * 60);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            log::info!(
                "Refreshing every {} minutes, Ctrl-C to stop",
                config.refresh.interval_minutes
            );

            let mut tracker = ChangeTracker::new();
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = tokio::signal::ctrl_c() => {
                        log::info!("Stopping watch");
                        break;
                    }
                }

                let outcome =
                    pipeline::run_refresh(&fetcher, &config, Local::now().date_naive()).await;

                if let Some(diff) = tracker.observe(&outcome) {
                    report_diff(&diff);
                }

                if let Some(path) = &output {
                    if let Err(e) = save_outcome(&outcome, path) {
                        log::error!("Could not save to {}: {}", path.display(), e);
                    }
                }
            }
        }

        Command::Classes => {
            let fetcher = build_fetcher(&config)?;
            let classes = fetcher.fetch_classes().await?;
            log::info!("Found {} classes", classes.len());
            for class_name in classes {
                println!("{class_name}");
            }
        }

        Command::Subjects => {
            let Some(class_name) = config.school.class_name.clone() else {
                return Err(AppError::config(
                    "No class selected. Set school.class_name or pass --class.",
                ));
            };

            let fetcher = build_fetcher(&config)?;
            let subjects =
                services::discover_subjects(&fetcher, &class_name, Local::now().date_naive())
                    .await;
            for subject in subjects {
                println!("{subject}");
            }
        }

        Command::Check => {
            let fetcher = build_fetcher(&config)?;
            if fetcher.test_connection().await? {
                log::info!("✓ Connected to school {}", config.school.school_id);
            } else {
                log::error!("Connection to school {} failed", config.school.school_id);
                return Err(AppError::validation("stundenplan24 rejected the connection"));
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
