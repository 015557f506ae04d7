use std::future::Future;
use std::pin::Pin;

use crate::error::AppError;
use crate::models::{ScrapeResult, SearchQuery};

/// What a browser session can do beyond page-level selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCapabilities {
    /// Whether element handles can be queried for sub-elements through the driver.
    /// Without it, fields are read from an outer-HTML snapshot of each card.
    pub element_queries: bool,
}

impl Default for SessionCapabilities {
    fn default() -> Self {
        Self {
            element_queries: true,
        }
    }
}

/// A single rendered node of the page, queryable for sub-fields.
pub trait ElementHandle: Send + Sync + Sized {
    /// First descendant matching `selector`, if any.
    fn query(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Self>, AppError>> + Send;

    /// Rendered text of the element.
    fn text(&self) -> impl Future<Output = Result<Option<String>, AppError>> + Send;

    fn attribute(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, AppError>> + Send;

    /// Serialized markup of the element, including itself.
    fn outer_html(&self) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// One browser tab, exclusively owned by a single scrape call.
pub trait BrowserSession: Send + Sync {
    type Element: ElementHandle;

    fn capabilities(&self) -> SessionCapabilities;

    /// Navigate to `url` and wait for the load.
    fn open(&self, url: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    fn current_url(&self) -> impl Future<Output = Result<String, AppError>> + Send;

    /// All elements matching `selector`. An empty vector is not an error.
    fn select_all(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Self::Element>, AppError>> + Send;

    /// First element matching `selector`, if any.
    fn select(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Self::Element>, AppError>> + Send;

    /// Type into the first element matching `selector`, optionally clearing it first.
    fn type_text(
        &self,
        selector: &str,
        text: &str,
        clear_first: bool,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn press_enter(&self, selector: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    fn click(&self, selector: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    fn scroll_to_bottom(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Best-effort attempt at an anti-bot interstitial. Returns whether one was handled.
    fn dismiss_challenge(&self) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Tear the session down. Consumes it so no scrape can reuse the driver.
    fn close(self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Creates a fresh browser session per scrape.
pub trait SessionFactory: Send + Sync + Clone {
    type Session: BrowserSession;

    fn launch(&self) -> impl Future<Output = Result<Self::Session, AppError>> + Send;
}

/// Object-safe entry point for running a scrape, so HTTP handlers do not
/// need to be generic over the driver.
pub trait ScrapeRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> Pin<Box<dyn Future<Output = Result<ScrapeResult, AppError>> + Send + 'a>>;
}
