use std::future::Future;
use std::pin::Pin;

use crate::delay::DelayPolicy;
use crate::error::AppError;
use crate::extract::{JobExtractor, LookupStrategy};
use crate::models::{ScrapeResult, SearchQuery};
use crate::navigator::{NavState, Navigator};
use crate::retry::RetryConfig;
use crate::session::ScrapeSession;
use crate::traits::{BrowserSession, ScrapeRunner, SessionFactory};

/// Runs a full scrape: validate → launch → search → paginate → close.
///
/// Generic over the browser driver and the delay policy, so tests run the
/// whole loop against a scripted session with no waits.
pub struct ScrapeService<F, D>
where
    F: SessionFactory,
    D: DelayPolicy,
{
    factory: F,
    delay: D,
    retry: RetryConfig,
    extractor: JobExtractor,
    strategy: Option<LookupStrategy>,
}

impl<F, D> ScrapeService<F, D>
where
    F: SessionFactory,
    D: DelayPolicy,
{
    pub fn new(factory: F, delay: D) -> Self {
        Self {
            factory,
            delay,
            retry: RetryConfig::default(),
            extractor: JobExtractor::new(),
            strategy: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Force a lookup path instead of following the session's capabilities.
    pub fn with_strategy(mut self, strategy: Option<LookupStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Scrape Indeed for `query`.
    ///
    /// Invalid input is rejected before a browser is launched. A launch
    /// failure is returned as `Err`; everything after that is reported
    /// through the result's `success` flag and message.
    pub async fn scrape(&self, query: &SearchQuery) -> Result<ScrapeResult, AppError> {
        query.validate()?;

        tracing::info!(
            job_title = %query.job_title,
            location = %query.location,
            pages = query.pages,
            "Starting scrape"
        );
        let mut scrape = ScrapeSession::new();
        let session = self.factory.launch().await?;

        let mut navigator = Navigator::new(&session, &self.delay, &self.retry, &self.extractor);
        if let Some(strategy) = self.strategy {
            navigator = navigator.with_strategy(strategy);
        }
        let state = navigator.run(query, &mut scrape).await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close browser session");
        }

        let result = match state {
            NavState::Failed(message) => scrape.fail(message),
            _ => scrape.finish(),
        };

        if let Some(stats) = &result.stats {
            tracing::info!(
                success = result.success,
                jobs = result.total_jobs,
                pages = result.pages_scraped,
                skipped = stats.records_skipped,
                errors = stats.errors_encountered,
                duration_secs = stats.duration_seconds,
                "Scrape finished"
            );
        }
        Ok(result)
    }
}

impl<F, D> ScrapeRunner for ScrapeService<F, D>
where
    F: SessionFactory + 'static,
    D: DelayPolicy + 'static,
{
    fn run<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> Pin<Box<dyn Future<Output = Result<ScrapeResult, AppError>> + Send + 'a>> {
        Box::pin(self.scrape(query))
    }
}
