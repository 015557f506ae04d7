//! Per-call accumulation of records and counters.

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::models::{JobRecord, ScrapeResult, ScrapeStats};

/// Ephemeral state for one `scrape` call. Dropped once the result is built.
#[derive(Debug)]
pub struct ScrapeSession {
    jobs: Vec<JobRecord>,
    pages_attempted: u32,
    pages_completed: u32,
    records_skipped: usize,
    errors_encountered: u32,
    started_at: DateTime<Utc>,
    clock: Instant,
}

impl Default for ScrapeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapeSession {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            pages_attempted: 0,
            pages_completed: 0,
            records_skipped: 0,
            errors_encountered: 0,
            started_at: Utc::now(),
            clock: Instant::now(),
        }
    }

    pub fn begin_page(&mut self) {
        self.pages_attempted += 1;
    }

    /// Page `page` (1-indexed) had its cards processed.
    pub fn complete_page(&mut self, page: u32) {
        self.pages_completed = self.pages_completed.max(page);
    }

    /// Append an extracted record; `None` counts as a skipped card.
    pub fn record(&mut self, record: Option<JobRecord>) {
        match record {
            Some(record) => self.jobs.push(record),
            None => self.records_skipped += 1,
        }
    }

    pub fn record_errors(&mut self, count: u32) {
        self.errors_encountered += count;
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn pages_completed(&self) -> u32 {
        self.pages_completed
    }

    pub fn stats(&self) -> ScrapeStats {
        let duration = self.clock.elapsed().as_secs_f64();
        let success_rate =
            f64::from(self.pages_completed) / f64::from(self.pages_attempted.max(1)) * 100.0;
        ScrapeStats {
            pages_attempted: self.pages_attempted,
            pages_completed: self.pages_completed,
            records_found: self.jobs.len(),
            records_skipped: self.records_skipped,
            errors_encountered: self.errors_encountered,
            started_at: self.started_at,
            finished_at: Utc::now(),
            duration_seconds: duration,
            success_rate,
        }
    }

    /// Successful result carrying every record collected so far.
    pub fn finish(self) -> ScrapeResult {
        let stats = self.stats();
        let message = format!(
            "Successfully scraped {} jobs from {} pages in {:.1}s",
            self.jobs.len(),
            self.pages_completed,
            stats.duration_seconds
        );
        ScrapeResult::succeeded(message, self.jobs, self.pages_completed, Some(stats))
    }

    /// Failed result; collected records are discarded.
    pub fn fail(self, message: impl Into<String>) -> ScrapeResult {
        ScrapeResult::failed(message, Some(self.stats()))
    }
}
