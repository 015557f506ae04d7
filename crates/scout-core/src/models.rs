use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Value stored in a field whose selector chain produced nothing.
pub const NOT_FOUND: &str = "N/A";

/// Titles shorter than this (after trimming) are treated as extraction noise.
pub const MIN_TITLE_LEN: usize = 3;

pub const DEFAULT_LOCATION: &str = "Remote";
pub const MAX_PAGES: u32 = 10;

/// One job listing extracted from a search-results card.
///
/// Field names on the wire follow the export column headers
/// (`Title`, `Company`, `Location`, `Link`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
}

impl JobRecord {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            link: link.into(),
        }
    }

    /// Field values in export column order.
    pub fn fields(&self) -> [&str; 4] {
        [&self.title, &self.company, &self.location, &self.link]
    }

    /// A record is only kept when its title was actually found.
    pub fn has_valid_title(&self) -> bool {
        is_valid_title(&self.title)
    }
}

pub fn is_valid_title(title: &str) -> bool {
    let trimmed = title.trim();
    trimmed != NOT_FOUND && trimmed.chars().count() >= MIN_TITLE_LEN
}

/// Caller-supplied search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub job_title: String,
    pub location: String,
    pub pages: u32,
}

impl SearchQuery {
    pub fn new(job_title: impl Into<String>, location: impl Into<String>, pages: u32) -> Self {
        Self {
            job_title: job_title.into(),
            location: location.into(),
            pages,
        }
    }

    /// Query with the default location and a single page.
    pub fn for_title(job_title: impl Into<String>) -> Self {
        Self::new(job_title, DEFAULT_LOCATION, 1)
    }

    /// Rejects an empty title or a page count outside `1..=MAX_PAGES`.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.job_title.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Job title cannot be empty".to_string(),
            ));
        }
        if !(1..=MAX_PAGES).contains(&self.pages) {
            return Err(AppError::ValidationError(format!(
                "Pages must be between 1 and {MAX_PAGES}, got {}",
                self.pages
            )));
        }
        Ok(())
    }
}

/// Counters collected over one scrape call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeStats {
    pub pages_attempted: u32,
    pub pages_completed: u32,
    pub records_found: usize,
    pub records_skipped: usize,
    pub errors_encountered: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_seconds: f64,
    /// Completed pages as a percentage of attempted pages.
    pub success_rate: f64,
}

/// Final payload of a scrape call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub success: bool,
    pub message: String,
    pub jobs: Vec<JobRecord>,
    pub total_jobs: usize,
    pub pages_scraped: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ScrapeStats>,
}

impl ScrapeResult {
    pub fn succeeded(
        message: impl Into<String>,
        jobs: Vec<JobRecord>,
        pages_scraped: u32,
        stats: Option<ScrapeStats>,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            total_jobs: jobs.len(),
            jobs,
            pages_scraped,
            stats,
        }
    }

    /// Failure never carries records or pages.
    pub fn failed(message: impl Into<String>, stats: Option<ScrapeStats>) -> Self {
        Self {
            success: false,
            message: message.into(),
            jobs: Vec::new(),
            total_jobs: 0,
            pages_scraped: 0,
            stats,
        }
    }
}
