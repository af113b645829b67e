//! Utility functions and helpers.

pub mod http;
pub mod time;

use chrono::NaiveDate;
use url::Url;

use crate::error::Result;

/// Build the URL of a file below `{base}/{school_id}/mobil/`.
pub fn school_url(base_url: &str, school_id: &str, path: &str) -> Result<Url> {
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
    Ok(base.join(&format!("{school_id}/mobil/{path}"))?)
}

/// File name of the class plan for one day (`PlanKlYYYYMMDD.xml`).
pub fn plan_file_name(date: NaiveDate) -> String {
    format!("PlanKl{}.xml", date.format("%Y%m%d"))
}
