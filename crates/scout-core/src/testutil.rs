//! Test utilities: a scripted browser session and fake element handles.
//!
//! Handwritten fakes for dependency injection in unit and integration tests.
//! State sits behind `Arc<Mutex<_>>` so the factory can hand out a session
//! while the test keeps a handle for assertions on recorded calls.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::selectors::{KEYWORD_INPUT, LOCATION_INPUT, NEXT_PAGE, SEARCH_URL, SUBMIT_BUTTON};
use crate::traits::{BrowserSession, ElementHandle, SessionCapabilities, SessionFactory};

// ---------------------------------------------------------------------------
// FakeElement
// ---------------------------------------------------------------------------

/// Element with canned text, attributes, children keyed by selector, and markup.
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    text: Option<String>,
    attributes: HashMap<String, String>,
    children: HashMap<String, FakeElement>,
    failing: HashSet<String>,
    html: String,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, selector: &str, child: FakeElement) -> Self {
        self.children.insert(selector.to_string(), child);
        self
    }

    /// Queries for `selector` return an error instead of a result.
    pub fn failing_on(mut self, selector: &str) -> Self {
        self.failing.insert(selector.to_string());
        self
    }

    pub fn with_html(mut self, html: &str) -> Self {
        self.html = html.to_string();
        self
    }
}

/// A job card in the current Indeed markup, usable through both lookup paths.
pub fn job_card(title: &str, company: &str, location: &str, href: &str) -> FakeElement {
    let html = format!(
        r#"<li class="css-5lfssm"><div class="job_seen_beacon"><h2 class="jobTitle"><a class="jcs-JobTitle" href="{href}"><span title="{title}">{title}</span></a></h2><span data-testid="company-name">{company}</span><div data-testid="text-location">{location}</div></div></li>"#
    );
    FakeElement::new()
        .with_child("h2 span[title]", FakeElement::new().with_attr("title", title).with_text(title))
        .with_child(
            r#"span[data-testid="company-name"]"#,
            FakeElement::new().with_text(company),
        )
        .with_child(
            r#"div[data-testid="text-location"]"#,
            FakeElement::new().with_text(location),
        )
        .with_child("a.jcs-JobTitle", FakeElement::new().with_attr("href", href))
        .with_html(&html)
}

/// `count` distinct cards titled "<prefix> 1" .. "<prefix> count".
pub fn job_cards(prefix: &str, count: usize) -> Vec<FakeElement> {
    (1..=count)
        .map(|i| {
            job_card(
                &format!("{prefix} {i}"),
                "Acme Corp",
                "Remote",
                &format!("/rc/clk?jk={prefix}{i}"),
            )
        })
        .collect()
}

impl ElementHandle for FakeElement {
    async fn query(&self, selector: &str) -> Result<Option<Self>, AppError> {
        if self.failing.contains(selector) {
            return Err(AppError::BrowserError(format!(
                "node detached while querying {selector}"
            )));
        }
        Ok(self.children.get(selector).cloned())
    }

    async fn text(&self) -> Result<Option<String>, AppError> {
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, AppError> {
        Ok(self.attributes.get(name).cloned())
    }

    async fn outer_html(&self) -> Result<String, AppError> {
        Ok(self.html.clone())
    }
}

// ---------------------------------------------------------------------------
// FakeSession
// ---------------------------------------------------------------------------

/// One results page: cards keyed by container selector, plus pagination.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    cards: HashMap<String, Vec<FakeElement>>,
    has_next: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(mut self, selector: &str, cards: Vec<FakeElement>) -> Self {
        self.cards.insert(selector.to_string(), cards);
        self
    }

    pub fn with_next(mut self) -> Self {
        self.has_next = true;
        self
    }
}

#[derive(Debug)]
struct FakeState {
    form: HashSet<String>,
    pages: Vec<FakePage>,
    /// `None` until the search form is submitted.
    current_page: Option<usize>,
    select_failures: u32,
    select_all_calls: u32,
    open_error: bool,
    click_errors: HashSet<String>,
    challenge: bool,
    closed: bool,
    calls: Vec<String>,
}

/// Scripted session that walks through a fixed list of result pages.
#[derive(Debug, Clone)]
pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
    capabilities: SessionCapabilities,
}

impl Default for FakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSession {
    /// Session whose landing page carries the primary search-form selectors.
    pub fn new() -> Self {
        let form = [KEYWORD_INPUT, LOCATION_INPUT, SUBMIT_BUTTON]
            .iter()
            .filter_map(|chain| chain.first())
            .map(str::to_string)
            .collect();
        Self {
            state: Arc::new(Mutex::new(FakeState {
                form,
                pages: Vec::new(),
                current_page: None,
                select_failures: 0,
                select_all_calls: 0,
                open_error: false,
                click_errors: HashSet::new(),
                challenge: false,
                closed: false,
                calls: Vec::new(),
            })),
            capabilities: SessionCapabilities::default(),
        }
    }

    pub fn with_page(self, page: FakePage) -> Self {
        self.state.lock().unwrap().pages.push(page);
        self
    }

    /// The first `n` `select_all` calls return a driver error.
    pub fn with_select_failures(self, n: u32) -> Self {
        self.state.lock().unwrap().select_failures = n;
        self
    }

    pub fn with_open_error(self) -> Self {
        self.state.lock().unwrap().open_error = true;
        self
    }

    /// Clicks on `selector` fail with a driver error.
    pub fn with_click_error(self, selector: &str) -> Self {
        self.state.lock().unwrap().click_errors.insert(selector.to_string());
        self
    }

    pub fn with_challenge(self) -> Self {
        self.state.lock().unwrap().challenge = true;
        self
    }

    pub fn without_form_selector(self, selector: &str) -> Self {
        self.state.lock().unwrap().form.remove(selector);
        self
    }

    pub fn with_form_selector(self, selector: &str) -> Self {
        self.state.lock().unwrap().form.insert(selector.to_string());
        self
    }

    /// Sessions without element queries force the HTML snapshot path.
    pub fn with_element_queries(mut self, enabled: bool) -> Self {
        self.capabilities.element_queries = enabled;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn select_all_calls(&self) -> u32 {
        self.state.lock().unwrap().select_all_calls
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn is_next_page(selector: &str) -> bool {
    NEXT_PAGE.first() == Some(selector)
}

impl BrowserSession for FakeSession {
    type Element = FakeElement;

    fn capabilities(&self) -> SessionCapabilities {
        self.capabilities
    }

    async fn open(&self, url: &str) -> Result<(), AppError> {
        self.log(format!("open:{url}"));
        let mut state = self.state.lock().unwrap();
        if state.open_error {
            return Err(AppError::BrowserError(format!("net::ERR_CONNECTION_RESET at {url}")));
        }
        // landing page shows the search form again
        if url == SEARCH_URL {
            state.current_page = None;
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, AppError> {
        let state = self.state.lock().unwrap();
        Ok(match state.current_page {
            Some(page) => format!("https://www.indeed.com/jobs?start={}", page * 10),
            None => "https://www.indeed.com/".to_string(),
        })
    }

    async fn select_all(&self, selector: &str) -> Result<Vec<FakeElement>, AppError> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        state.select_all_calls += 1;
        if state.select_failures > 0 {
            state.select_failures -= 1;
            return Err(AppError::BrowserError(format!(
                "DOM.querySelectorAll failed for {selector}"
            )));
        }
        Ok(state
            .current_page
            .and_then(|i| state.pages.get(i))
            .and_then(|page| page.cards.get(selector))
            .cloned()
            .unwrap_or_default())
    }

    async fn select(&self, selector: &str) -> Result<Option<FakeElement>, AppError> {
        let state = self.state.lock().unwrap();
        let present = match state.current_page {
            None => state.form.contains(selector),
            Some(i) => {
                is_next_page(selector) && state.pages.get(i).is_some_and(|p| p.has_next)
            }
        };
        Ok(present.then(FakeElement::new))
    }

    async fn type_text(&self, selector: &str, text: &str, clear_first: bool) -> Result<(), AppError> {
        if !self.state.lock().unwrap().form.contains(selector) {
            return Err(AppError::BrowserError(format!("no node for {selector}")));
        }
        let op = if clear_first { "clear+type" } else { "type" };
        self.log(format!("{op}:{selector}:{text}"));
        Ok(())
    }

    async fn press_enter(&self, selector: &str) -> Result<(), AppError> {
        self.log(format!("enter:{selector}"));
        self.state.lock().unwrap().current_page = Some(0);
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), AppError> {
        self.log(format!("click:{selector}"));
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        if state.click_errors.contains(selector) {
            return Err(AppError::BrowserError(format!("click intercepted: {selector}")));
        }
        let current = state.current_page;
        match current {
            None if state.form.contains(selector) => {
                state.current_page = Some(0);
                Ok(())
            }
            Some(i) if is_next_page(selector) && state.pages.get(i).is_some_and(|p| p.has_next) => {
                state.current_page = Some(i + 1);
                Ok(())
            }
            _ => Err(AppError::BrowserError(format!("element not clickable: {selector}"))),
        }
    }

    async fn scroll_to_bottom(&self) -> Result<(), AppError> {
        self.log("scroll".to_string());
        Ok(())
    }

    async fn dismiss_challenge(&self) -> Result<bool, AppError> {
        let handled = self.state.lock().unwrap().challenge;
        if handled {
            self.log("challenge".to_string());
        }
        Ok(handled)
    }

    async fn close(self) -> Result<(), AppError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeSessionFactory
// ---------------------------------------------------------------------------

/// Hands out clones of one scripted session (sharing its state).
#[derive(Clone)]
pub struct FakeSessionFactory {
    session: FakeSession,
    launch_error: Arc<Mutex<Option<AppError>>>,
    launches: Arc<Mutex<u32>>,
}

impl FakeSessionFactory {
    pub fn new(session: FakeSession) -> Self {
        Self {
            session,
            launch_error: Arc::new(Mutex::new(None)),
            launches: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_launch_error(error: AppError) -> Self {
        Self {
            session: FakeSession::new(),
            launch_error: Arc::new(Mutex::new(Some(error))),
            launches: Arc::new(Mutex::new(0)),
        }
    }

    pub fn session(&self) -> &FakeSession {
        &self.session
    }

    pub fn launches(&self) -> u32 {
        *self.launches.lock().unwrap()
    }
}

impl SessionFactory for FakeSessionFactory {
    type Session = FakeSession;

    async fn launch(&self) -> Result<FakeSession, AppError> {
        *self.launches.lock().unwrap() += 1;
        if let Some(e) = self.launch_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(self.session.clone())
    }
}
