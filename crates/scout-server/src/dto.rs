use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scout_core::analytics::{Frequency, RecordSummary};
use scout_core::error::AppError;
use scout_core::models::{
    DEFAULT_LOCATION, JobRecord, MAX_PAGES, ScrapeResult, ScrapeStats, SearchQuery,
};

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ScrapeRequest {
    pub job_title: String,
    #[serde(default = "default_location")]
    #[schema(default = "Remote")]
    pub location: String,
    #[serde(default = "default_pages")]
    #[schema(default = 1, minimum = 1, maximum = 10)]
    pub pages: i64,
    /// Store results under this id instead of a generated one.
    pub session_id: Option<String>,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_pages() -> i64 {
    1
}

impl ScrapeRequest {
    /// Build the search query, rejecting page counts that do not fit.
    /// The remaining checks are left to [`SearchQuery::validate`].
    pub fn query(&self) -> Result<SearchQuery, AppError> {
        let pages = u32::try_from(self.pages).map_err(|_| {
            AppError::ValidationError(format!(
                "Pages must be between 1 and {MAX_PAGES}, got {}",
                self.pages
            ))
        })?;
        Ok(SearchQuery::new(
            self.job_title.clone(),
            self.location.clone(),
            pages,
        ))
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct JobResponse {
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
}

impl From<&JobRecord> for JobResponse {
    fn from(job: &JobRecord) -> Self {
        Self {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            link: job.link.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScrapeStatsResponse {
    pub pages_attempted: u32,
    pub pages_completed: u32,
    pub records_found: usize,
    pub records_skipped: usize,
    pub errors_encountered: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub success_rate: f64,
}

impl From<ScrapeStats> for ScrapeStatsResponse {
    fn from(stats: ScrapeStats) -> Self {
        Self {
            pages_attempted: stats.pages_attempted,
            pages_completed: stats.pages_completed,
            records_found: stats.records_found,
            records_skipped: stats.records_skipped,
            errors_encountered: stats.errors_encountered,
            started_at: stats.started_at,
            finished_at: stats.finished_at,
            duration_seconds: stats.duration_seconds,
            success_rate: stats.success_rate,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScrapeResponse {
    pub success: bool,
    pub message: String,
    pub jobs: Vec<JobResponse>,
    pub total_jobs: usize,
    pub pages_scraped: u32,
    /// Pass as `?session=` to the download and stats endpoints.
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ScrapeStatsResponse>,
}

impl ScrapeResponse {
    pub fn new(result: ScrapeResult, session_id: String) -> Self {
        Self {
            success: result.success,
            message: result.message,
            jobs: result.jobs.iter().map(JobResponse::from).collect(),
            total_jobs: result.total_jobs,
            pages_scraped: result.pages_scraped,
            session_id,
            stats: result.stats.map(ScrapeStatsResponse::from),
        }
    }
}

// ---------------------------------------------------------------------------
// Downloads & stats
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SessionQuery {
    /// Session id returned by `POST /scrape`. Defaults to the latest scrape.
    pub session: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FrequencyResponse {
    pub name: String,
    pub count: usize,
}

impl From<Frequency> for FrequencyResponse {
    fn from(f: Frequency) -> Self {
        Self {
            name: f.name,
            count: f.count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AnalyticsResponse {
    pub unique_companies: usize,
    pub unique_locations: usize,
    pub top_companies: Vec<FrequencyResponse>,
    pub top_locations: Vec<FrequencyResponse>,
}

impl From<RecordSummary> for AnalyticsResponse {
    fn from(summary: RecordSummary) -> Self {
        Self {
            unique_companies: summary.unique_companies,
            unique_locations: summary.unique_locations,
            top_companies: summary.top_companies.into_iter().map(Into::into).collect(),
            top_locations: summary.top_locations.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub current_jobs_count: usize,
    pub has_data: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<AnalyticsResponse>,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub current_jobs_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
