pub mod analytics;
pub mod config;
pub mod delay;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod navigator;
pub mod retry;
pub mod scrape;
pub mod selectors;
pub mod session;
pub mod store;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::AppError;
pub use export::ExportFormat;
pub use models::{JobRecord, ScrapeResult, ScrapeStats, SearchQuery};
pub use scrape::ScrapeService;
pub use store::ResultStore;
pub use traits::{BrowserSession, ElementHandle, ScrapeRunner, SessionFactory};
