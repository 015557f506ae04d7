use std::sync::Arc;

use scout_core::{ResultStore, ScrapeRunner};

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    /// Runs one scrape per request with a fresh browser session.
    pub runner: Arc<dyn ScrapeRunner>,
    /// Records of past scrapes, keyed by session id.
    pub store: ResultStore,
}

impl AppState {
    pub fn new(runner: Arc<dyn ScrapeRunner>, store: ResultStore) -> Self {
        Self { runner, store }
    }
}
