//! Search-form submission and results pagination.
//!
//! ```text
//! Init --submit--> SearchSubmitted --> PageLoaded(1) --next--> PageLoaded(2) ...
//!   |                                      |
//!   +--setup error--> Failed               +--no cards on page 1--> Failed
//!                                          +--page limit / no next / no cards--> Done
//! ```

use crate::delay::{
    AFTER_CHALLENGE, AFTER_KEYWORD, AFTER_LOCATION, AFTER_NEXT_PAGE, AFTER_OPEN, AFTER_SUBMIT,
    DelayPolicy, PAGE_SETTLE,
};
use crate::error::AppError;
use crate::extract::{JobExtractor, LookupStrategy};
use crate::models::SearchQuery;
use crate::retry::{RetryConfig, select_all_with_retries};
use crate::selectors::{
    JOB_CARDS, KEYWORD_INPUT, LOCATION_INPUT, NEXT_PAGE, SEARCH_URL, SUBMIT_BUTTON, SelectorChain,
};
use crate::session::ScrapeSession;
use crate::traits::BrowserSession;

pub const NO_LISTINGS_MESSAGE: &str =
    "No job listings found. The page structure may have changed.";

/// Why a traversal stopped without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The requested number of pages was processed.
    PageLimit,
    /// A page after the first had no job cards.
    NoMoreResults,
    /// No next-page control on the last processed page.
    NoNextPage,
    /// Moving to the next page failed; earlier pages are kept.
    PageError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Init,
    SearchSubmitted,
    /// 1-indexed results page currently displayed.
    PageLoaded(u32),
    Done(EndReason),
    Failed(String),
}

impl NavState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NavState::Done(_) | NavState::Failed(_))
    }
}

/// Drives one browser session through the search and its result pages.
pub struct Navigator<'a, S, D> {
    session: &'a S,
    delay: &'a D,
    retry: &'a RetryConfig,
    extractor: &'a JobExtractor,
    strategy: LookupStrategy,
}

impl<'a, S, D> Navigator<'a, S, D>
where
    S: BrowserSession,
    D: DelayPolicy,
{
    pub fn new(
        session: &'a S,
        delay: &'a D,
        retry: &'a RetryConfig,
        extractor: &'a JobExtractor,
    ) -> Self {
        Self {
            session,
            delay,
            retry,
            extractor,
            strategy: LookupStrategy::for_capabilities(session.capabilities()),
        }
    }

    /// Override the lookup path chosen from the session's capabilities.
    pub fn with_strategy(mut self, strategy: LookupStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run until `Done` or `Failed`, collecting records into `scrape`.
    pub async fn run(&self, query: &SearchQuery, scrape: &mut ScrapeSession) -> NavState {
        let mut state = NavState::Init;
        while !state.is_terminal() {
            state = self.step(state, query, scrape).await;
        }
        state
    }

    async fn step(&self, state: NavState, query: &SearchQuery, scrape: &mut ScrapeSession) -> NavState {
        match state {
            NavState::Init => match self.submit_search(query).await {
                Ok(()) => NavState::SearchSubmitted,
                Err(e) => {
                    let detail = match e {
                        AppError::SearchSetupError(detail) => detail,
                        other => other.to_string(),
                    };
                    tracing::error!(error = %detail, "Search form interaction failed");
                    NavState::Failed(format!("Search form interaction failed: {detail}"))
                }
            },
            NavState::SearchSubmitted => NavState::PageLoaded(1),
            NavState::PageLoaded(page) => self.process_page(page, query, scrape).await,
            terminal => terminal,
        }
    }

    async fn process_page(
        &self,
        page: u32,
        query: &SearchQuery,
        scrape: &mut ScrapeSession,
    ) -> NavState {
        tracing::info!(page, of = query.pages, "Scraping results page");
        scrape.begin_page();
        self.delay.pause(PAGE_SETTLE).await;

        let cards = match self.find_job_cards(scrape).await {
            Ok(cards) => cards,
            Err(e) if page == 1 => {
                tracing::error!(page, error = %e, "No job cards on first page");
                return NavState::Failed(NO_LISTINGS_MESSAGE.to_string());
            }
            Err(e) => {
                tracing::info!(page, error = %e, "No job cards, stopping");
                return NavState::Done(EndReason::NoMoreResults);
            }
        };

        tracing::info!(page, count = cards.len(), "Found job cards");
        for (i, card) in cards.iter().enumerate() {
            let record = self.extractor.extract(card, i + 1, self.strategy).await;
            scrape.record(record);
        }
        scrape.complete_page(page);
        tracing::info!(page, total = scrape.jobs().len(), "Page complete");

        if page >= query.pages {
            return NavState::Done(EndReason::PageLimit);
        }
        match self.next_page().await {
            Ok(true) => NavState::PageLoaded(page + 1),
            Ok(false) => {
                tracing::info!(page, "No next page control, stopping");
                NavState::Done(EndReason::NoNextPage)
            }
            Err(e) => {
                scrape.record_errors(1);
                tracing::warn!(page, error = %e, "Pagination failed, keeping collected results");
                NavState::Done(EndReason::PageError)
            }
        }
    }

    /// Open the landing page and submit the job title and location.
    pub async fn submit_search(&self, query: &SearchQuery) -> Result<(), AppError> {
        tracing::info!(job_title = %query.job_title, location = %query.location, "Opening search page");
        self.session
            .open(SEARCH_URL)
            .await
            .map_err(|e| AppError::SearchSetupError(format!("could not open {SEARCH_URL}: {e}")))?;
        self.delay.pause(AFTER_OPEN).await;

        match self.session.dismiss_challenge().await {
            Ok(true) => {
                tracing::info!("Challenge widget handled");
                self.delay.pause(AFTER_CHALLENGE).await;
            }
            Ok(false) => {}
            Err(e) => tracing::debug!(error = %e, "Challenge check failed"),
        }

        let keyword = self.require(KEYWORD_INPUT).await?;
        self.session
            .type_text(keyword, &query.job_title, false)
            .await
            .map_err(|e| setup_error(KEYWORD_INPUT, e))?;
        self.delay.pause(AFTER_KEYWORD).await;

        let location = self.require(LOCATION_INPUT).await?;
        self.session
            .type_text(location, &query.location, true)
            .await
            .map_err(|e| setup_error(LOCATION_INPUT, e))?;
        self.delay.pause(AFTER_LOCATION).await;

        match self.first_present(SUBMIT_BUTTON).await {
            Some(submit) => self
                .session
                .click(submit)
                .await
                .map_err(|e| setup_error(SUBMIT_BUTTON, e))?,
            None => {
                tracing::debug!(selector = keyword, "No submit control, pressing Enter");
                self.session
                    .press_enter(keyword)
                    .await
                    .map_err(|e| setup_error(KEYWORD_INPUT, e))?;
            }
        }
        self.delay.pause(AFTER_SUBMIT).await;
        tracing::info!("Search submitted");
        Ok(())
    }

    /// First selector of `chain` that matches an element right now.
    pub async fn first_present(&self, chain: SelectorChain) -> Option<&'static str> {
        for selector in chain.iter() {
            match self.session.select(selector).await {
                Ok(Some(_)) => return Some(selector),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(target_name = chain.target, selector, error = %e, "Lookup failed")
                }
            }
        }
        None
    }

    async fn require(&self, chain: SelectorChain) -> Result<&'static str, AppError> {
        self.first_present(chain)
            .await
            .ok_or_else(|| AppError::SearchSetupError(format!("no {} found", chain.target)))
    }

    /// Try each job-card selector with retries; the first non-empty match wins.
    pub async fn find_job_cards(
        &self,
        scrape: &mut ScrapeSession,
    ) -> Result<Vec<S::Element>, AppError> {
        let mut attempts = 0;
        for selector in JOB_CARDS.iter() {
            let outcome = select_all_with_retries(self.session, selector, self.retry, self.delay).await;
            attempts += outcome.attempts;
            scrape.record_errors(outcome.failures);
            if !outcome.elements.is_empty() {
                tracing::debug!(selector, count = outcome.elements.len(), "Job card selector matched");
                return Ok(outcome.elements);
            }
        }
        Err(AppError::SelectionTimeout {
            selector: JOB_CARDS.target.to_string(),
            attempts,
        })
    }

    /// Click the next-page control. `Ok(false)` when there is none.
    pub async fn next_page(&self) -> Result<bool, AppError> {
        let Some(selector) = self.first_present(NEXT_PAGE).await else {
            return Ok(false);
        };
        self.session.click(selector).await?;
        self.delay.pause(AFTER_NEXT_PAGE).await;
        Ok(true)
    }
}

fn setup_error(chain: SelectorChain, error: AppError) -> AppError {
    AppError::SearchSetupError(format!("{}: {error}", chain.target))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::delay::NoDelay;
    use crate::testutil::{FakePage, FakeSession, job_cards};

    const CARDS: &str = "li.css-5lfssm";

    fn retry() -> RetryConfig {
        RetryConfig::default().with_backoff_factor(Duration::ZERO)
    }

    async fn run(session: &FakeSession, query: &SearchQuery) -> (NavState, ScrapeSession) {
        let retry = retry();
        let extractor = JobExtractor::new();
        let mut scrape = ScrapeSession::new();
        let state = Navigator::new(session, &NoDelay, &retry, &extractor)
            .run(query, &mut scrape)
            .await;
        (state, scrape)
    }

    #[tokio::test]
    async fn single_page_without_next_control() {
        let session = FakeSession::new().with_page(FakePage::new().with_cards(CARDS, job_cards("Dev", 15)));
        let query = SearchQuery::new("Software Engineer", "Remote", 3);

        let (state, scrape) = run(&session, &query).await;

        assert_eq!(state, NavState::Done(EndReason::NoNextPage));
        let result = scrape.finish();
        assert!(result.success);
        assert_eq!(result.total_jobs, 15);
        assert_eq!(result.pages_scraped, 1);
    }

    #[tokio::test]
    async fn follows_next_page_until_limit() {
        let session = FakeSession::new()
            .with_page(FakePage::new().with_cards(CARDS, job_cards("A", 3)).with_next())
            .with_page(FakePage::new().with_cards(CARDS, job_cards("B", 2)).with_next())
            .with_page(FakePage::new().with_cards(CARDS, job_cards("C", 4)));
        let query = SearchQuery::new("Rust Developer", "Berlin", 2);

        let (state, scrape) = run(&session, &query).await;

        assert_eq!(state, NavState::Done(EndReason::PageLimit));
        let titles: Vec<_> = scrape.jobs().iter().map(|j| j.title.clone()).collect();
        assert_eq!(titles, ["A 1", "A 2", "A 3", "B 1", "B 2"]);
        assert_eq!(scrape.finish().pages_scraped, 2);
    }

    #[tokio::test]
    async fn empty_later_page_ends_gracefully() {
        let session = FakeSession::new()
            .with_page(FakePage::new().with_cards(CARDS, job_cards("A", 2)).with_next())
            .with_page(FakePage::new());
        let query = SearchQuery::new("Rust Developer", "Remote", 5);

        let (state, scrape) = run(&session, &query).await;

        assert_eq!(state, NavState::Done(EndReason::NoMoreResults));
        let result = scrape.finish();
        assert!(result.success);
        assert_eq!(result.total_jobs, 2);
        assert_eq!(result.pages_scraped, 1);
    }

    #[tokio::test]
    async fn pagination_error_keeps_collected_records() {
        let next = NEXT_PAGE.first().unwrap();
        let session = FakeSession::new()
            .with_page(FakePage::new().with_cards(CARDS, job_cards("A", 3)).with_next())
            .with_page(FakePage::new().with_cards(CARDS, job_cards("B", 2)))
            .with_click_error(next);
        let query = SearchQuery::new("Rust Developer", "Remote", 3);

        let (state, scrape) = run(&session, &query).await;

        assert_eq!(state, NavState::Done(EndReason::PageError));
        let result = scrape.finish();
        assert!(result.success);
        assert_eq!(result.pages_scraped, 1);
        let titles: Vec<_> = result.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, ["A 1", "A 2", "A 3"]);
        assert_eq!(result.stats.unwrap().errors_encountered, 1);
        assert!(session.calls().contains(&format!("click:{next}")));
    }

    #[tokio::test]
    async fn empty_first_page_fails() {
        let session = FakeSession::new().with_page(FakePage::new());
        let query = SearchQuery::for_title("Software Engineer");

        let (state, _) = run(&session, &query).await;

        assert_eq!(state, NavState::Failed(NO_LISTINGS_MESSAGE.to_string()));
        // every card selector, three attempts each
        assert_eq!(session.select_all_calls(), 3 * JOB_CARDS.len() as u32);
    }

    #[tokio::test]
    async fn falls_back_to_later_card_selector() {
        let session = FakeSession::new()
            .with_page(FakePage::new().with_cards("[data-jk]", job_cards("Dev", 2)));
        let query = SearchQuery::for_title("Software Engineer");

        let (state, scrape) = run(&session, &query).await;

        assert_eq!(state, NavState::Done(EndReason::PageLimit));
        assert_eq!(scrape.jobs().len(), 2);
    }

    #[tokio::test]
    async fn fills_form_and_clicks_submit() {
        let session = FakeSession::new().with_page(FakePage::new().with_cards(CARDS, job_cards("Dev", 1)));
        let query = SearchQuery::new("Data Engineer", "Austin, TX", 1);

        run(&session, &query).await;

        let calls = session.calls();
        assert_eq!(calls[0], "open:https://www.indeed.com/");
        assert!(calls.contains(&r#"type:input[id="text-input-what"]:Data Engineer"#.to_string()));
        assert!(calls.contains(&r#"clear+type:input[id="text-input-where"]:Austin, TX"#.to_string()));
        assert!(calls.contains(&r#"click:button[type="submit"]"#.to_string()));
        assert!(!calls.iter().any(|c| c.starts_with("enter:")));
    }

    #[tokio::test]
    async fn presses_enter_without_submit_control() {
        let session = FakeSession::new()
            .without_form_selector(r#"button[type="submit"]"#)
            .with_page(FakePage::new().with_cards(CARDS, job_cards("Dev", 1)));
        let query = SearchQuery::for_title("Data Engineer");

        let (state, _) = run(&session, &query).await;

        assert_eq!(state, NavState::Done(EndReason::PageLimit));
        assert!(session.calls().contains(&r#"enter:input[id="text-input-what"]"#.to_string()));
    }

    #[tokio::test]
    async fn uses_fallback_keyword_selector() {
        let session = FakeSession::new()
            .without_form_selector(r#"input[id="text-input-what"]"#)
            .with_form_selector(r#"input[name="q"]"#)
            .with_page(FakePage::new().with_cards(CARDS, job_cards("Dev", 1)));
        let query = SearchQuery::for_title("Rust Developer");

        run(&session, &query).await;

        assert!(session.calls().contains(&r#"type:input[name="q"]:Rust Developer"#.to_string()));
    }

    #[tokio::test]
    async fn missing_keyword_input_fails_setup() {
        let session = FakeSession::new().without_form_selector(r#"input[id="text-input-what"]"#);
        let query = SearchQuery::for_title("Rust Developer");

        let (state, _) = run(&session, &query).await;

        match state {
            NavState::Failed(message) => {
                assert!(message.starts_with("Search form interaction failed:"));
                assert!(message.contains("job title input"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(session.select_all_calls(), 0);
    }

    #[tokio::test]
    async fn open_error_fails_setup() {
        let session = FakeSession::new().with_open_error();
        let (state, _) = run(&session, &SearchQuery::for_title("Rust Developer")).await;
        assert!(matches!(state, NavState::Failed(m) if m.contains("could not open")));
    }

    #[tokio::test]
    async fn challenge_is_handled_before_typing() {
        let session = FakeSession::new()
            .with_challenge()
            .with_page(FakePage::new().with_cards(CARDS, job_cards("Dev", 1)));

        run(&session, &SearchQuery::for_title("Rust Developer")).await;

        let calls = session.calls();
        let challenge = calls.iter().position(|c| c == "challenge").unwrap();
        let typed = calls.iter().position(|c| c.starts_with("type:")).unwrap();
        assert!(challenge < typed);
    }

    #[tokio::test]
    async fn snapshot_path_when_element_queries_unavailable() {
        let session = FakeSession::new()
            .with_element_queries(false)
            .with_page(FakePage::new().with_cards(CARDS, job_cards("Dev", 3)));

        let (_, scrape) = run(&session, &SearchQuery::for_title("Rust Developer")).await;

        assert_eq!(scrape.jobs().len(), 3);
        assert_eq!(scrape.jobs()[0].link, "https://www.indeed.com/rc/clk?jk=Dev1");
    }

    #[tokio::test]
    async fn transient_select_errors_are_counted() {
        let session = FakeSession::new()
            .with_page(FakePage::new().with_cards(CARDS, job_cards("Dev", 2)))
            .with_select_failures(2);

        let (_, scrape) = run(&session, &SearchQuery::for_title("Rust Developer")).await;

        let stats = scrape.stats();
        assert_eq!(stats.records_found, 2);
        assert_eq!(stats.errors_encountered, 2);
    }

    #[tokio::test]
    async fn pages_scraped_never_exceeds_request() {
        for pages in 1..=4 {
            let mut session = FakeSession::new();
            for i in 0..6 {
                session = session.with_page(
                    FakePage::new()
                        .with_cards(CARDS, job_cards(&format!("P{i}"), 2))
                        .with_next(),
                );
            }
            let query = SearchQuery::new("Rust Developer", "Remote", pages);

            let (_, scrape) = run(&session, &query).await;
            let result = scrape.finish();

            assert_eq!(result.pages_scraped, pages);
            assert_eq!(result.total_jobs, result.jobs.len());
        }
    }
}
