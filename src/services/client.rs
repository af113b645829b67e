// src/services/client.rs

//! Schedule sources.
//!
//! `ScheduleSource` is the transport seam of the pipeline; the fetcher only
//! sees raw XML documents. `Stundenplan24Client` implements it over HTTP
//! Basic authentication.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::{ClientConfig, SchoolConfig};
use crate::utils::http::create_async_client;
use crate::utils::{plan_file_name, school_url};

/// A source of raw schedule documents.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch the class plan XML for one day.
    async fn fetch_day_document(&self, date: NaiveDate) -> Result<String>;

    /// Fetch the class list XML.
    async fn fetch_class_list(&self) -> Result<String>;

    /// Check that the source is reachable and accepts the credentials.
    async fn test_connection(&self) -> Result<bool>;
}

/// HTTP client for one school on stundenplan24.
///
/// Holds a single connection pool that is reused across fetches and released
/// when the client is dropped.
pub struct Stundenplan24Client {
    client: Client,
    base_url: String,
    school_id: String,
    username: String,
    password: String,
}

impl Stundenplan24Client {
    /// Create a client for the configured school.
    pub fn new(school: &SchoolConfig, config: &ClientConfig) -> Result<Self> {
        if school.school_id.trim().is_empty() {
            return Err(AppError::config("school_id is required"));
        }

        Ok(Self {
            client: create_async_client(config)?,
            base_url: config.base_url.clone(),
            school_id: school.school_id.clone(),
            username: school.username.clone(),
            password: school.password.clone(),
        })
    }

    /// URL of the class plan for one day.
    pub fn day_url(&self, date: NaiveDate) -> Result<String> {
        let path = format!("mobdaten/{}", plan_file_name(date));
        Ok(school_url(&self.base_url, &self.school_id, &path)?.to_string())
    }

    fn classes_url(&self) -> Result<String> {
        Ok(school_url(&self.base_url, &self.school_id, "mobdaten/Klassen.xml")?.to_string())
    }

    fn test_url(&self) -> Result<String> {
        Ok(school_url(&self.base_url, &self.school_id, "plankl.html")?.to_string())
    }

    /// GET a document; anything but 200 is an error.
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::from_status(url, status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ScheduleSource for Stundenplan24Client {
    async fn fetch_day_document(&self, date: NaiveDate) -> Result<String> {
        let url = self.day_url(date)?;
        log::debug!("Fetching plan for {date} from {url}");
        self.get_text(&url).await
    }

    async fn fetch_class_list(&self) -> Result<String> {
        let url = self.classes_url()?;
        log::debug!("Fetching class list from {url}");
        self.get_text(&url).await
    }

    async fn test_connection(&self) -> Result<bool> {
        let url = self.test_url()?;
        match self.get_text(&url).await {
            Ok(_) => Ok(true),
            Err(AppError::Status { status, .. }) => {
                log::warn!("Connection test answered HTTP {status}");
                Ok(false)
            }
            Err(AppError::Unauthorized { status }) => {
                log::warn!("Connection test rejected credentials (HTTP {status})");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
