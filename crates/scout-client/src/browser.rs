use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use scout_core::config::ScraperConfig;
use scout_core::error::AppError;
use scout_core::selectors::CHALLENGE;
use scout_core::traits::{BrowserSession, ElementHandle, SessionCapabilities, SessionFactory};
use tokio::task::JoinHandle;

/// Desktop user agents rotated across launches.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
];

/// Launches one Chromium process per scrape via the Chrome DevTools Protocol.
///
/// Clones share the user-agent rotation counter, so consecutive scrapes from
/// the same server present different agents.
#[derive(Clone)]
pub struct ChromeSessionFactory {
    config: ScraperConfig,
    next_agent: Arc<AtomicUsize>,
}

impl ChromeSessionFactory {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            next_agent: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// User agent for the next launch.
    pub fn next_user_agent(&self) -> &'static str {
        let i = self.next_agent.fetch_add(1, Ordering::Relaxed);
        USER_AGENTS[i % USER_AGENTS.len()]
    }

    fn browser_config(&self, user_agent: &str) -> Result<BrowserConfig, AppError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .disable_default_args()
            .request_timeout(self.config.nav_timeout)
            .window_size(1920, 1080);

        if let Some(bin) = find_chrome_binary(self.config.chrome_bin.as_ref()) {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        builder = if self.config.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };

        builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg(format!("--user-agent={user_agent}"))
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))
    }
}

impl SessionFactory for ChromeSessionFactory {
    type Session = ChromeSession;

    async fn launch(&self) -> Result<ChromeSession, AppError> {
        let user_agent = self.next_user_agent();
        tracing::info!(user_agent, headless = self.config.headless, "Launching browser");
        let config = self.browser_config(user_agent)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::debug!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(AppError::BrowserError(format!("Failed to open tab: {e}")));
            }
        };

        Ok(ChromeSession {
            browser,
            page,
            handler,
            timeout: self.config.nav_timeout,
        })
    }
}

/// Candidate Chrome/Chromium locations, most specific first.
///
/// Snap-packaged Chromium ships a wrapper that rejects standard CLI flags,
/// so the real binary inside the snap is preferred.
const CHROME_CANDIDATES: &[&str] = &[
    "/snap/chromium/current/usr/lib/chromium-browser/chrome",
    "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
];

/// Explicit override first, then well-known paths. `None` lets chromiumoxide search.
fn find_chrome_binary(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.clone());
        }
        tracing::warn!("CHROME_BIN {} does not exist, searching defaults", path.display());
    }
    CHROME_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn cdp_error(action: &str, e: impl std::fmt::Display) -> AppError {
    AppError::BrowserError(format!("{action}: {e}"))
}

/// One tab in a dedicated Chromium process.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    timeout: Duration,
}

impl ChromeSession {
    async fn first(&self, selector: &str) -> Result<Element, AppError> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| cdp_error(&format!("querying {selector}"), e))?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::BrowserError(format!("no element matches {selector}")))
    }
}

impl BrowserSession for ChromeSession {
    type Element = ChromeElement;

    fn capabilities(&self) -> SessionCapabilities {
        SessionCapabilities {
            element_queries: true,
        }
    }

    async fn open(&self, url: &str) -> Result<(), AppError> {
        match tokio::time::timeout(self.timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(cdp_error(&format!("Failed to navigate to {url}"), e)),
            Err(_) => Err(AppError::Timeout(self.timeout.as_secs())),
        }
    }

    async fn current_url(&self) -> Result<String, AppError> {
        self.page
            .url()
            .await
            .map_err(|e| cdp_error("reading current URL", e))?
            .ok_or_else(|| AppError::BrowserError("page has no URL".into()))
    }

    async fn select_all(&self, selector: &str) -> Result<Vec<ChromeElement>, AppError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| cdp_error(&format!("querying {selector}"), e))?;
        Ok(elements.into_iter().map(ChromeElement).collect())
    }

    async fn select(&self, selector: &str) -> Result<Option<ChromeElement>, AppError> {
        Ok(self.select_all(selector).await?.into_iter().next())
    }

    async fn type_text(&self, selector: &str, text: &str, clear_first: bool) -> Result<(), AppError> {
        let element = self.first(selector).await?;
        element
            .click()
            .await
            .map_err(|e| cdp_error(&format!("focusing {selector}"), e))?;
        if clear_first {
            element
                .call_js_fn("function() { this.value = ''; }", false)
                .await
                .map_err(|e| cdp_error(&format!("clearing {selector}"), e))?;
        }
        element
            .type_str(text)
            .await
            .map_err(|e| cdp_error(&format!("typing into {selector}"), e))?;
        Ok(())
    }

    async fn press_enter(&self, selector: &str) -> Result<(), AppError> {
        self.first(selector)
            .await?
            .press_key("Enter")
            .await
            .map_err(|e| cdp_error(&format!("pressing Enter in {selector}"), e))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), AppError> {
        self.first(selector)
            .await?
            .click()
            .await
            .map_err(|e| cdp_error(&format!("clicking {selector}"), e))?;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<(), AppError> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map_err(|e| cdp_error("scrolling", e))?;
        Ok(())
    }

    async fn dismiss_challenge(&self) -> Result<bool, AppError> {
        for selector in CHALLENGE.iter() {
            if let Some(widget) = self.select(selector).await? {
                tracing::info!(selector, "Challenge widget detected, clicking");
                widget
                    .0
                    .click()
                    .await
                    .map_err(|e| cdp_error(&format!("clicking {selector}"), e))?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn close(mut self) -> Result<(), AppError> {
        let closed = self.browser.close().await;
        self.handler.abort();
        closed.map_err(|e| cdp_error("closing browser", e))?;
        tracing::debug!("Browser closed");
        Ok(())
    }
}

/// A DOM node addressed through CDP.
pub struct ChromeElement(Element);

impl ElementHandle for ChromeElement {
    async fn query(&self, selector: &str) -> Result<Option<Self>, AppError> {
        let found = self
            .0
            .find_elements(selector)
            .await
            .map_err(|e| cdp_error(&format!("querying {selector}"), e))?;
        Ok(found.into_iter().next().map(ChromeElement))
    }

    async fn text(&self) -> Result<Option<String>, AppError> {
        self.0
            .inner_text()
            .await
            .map_err(|e| cdp_error("reading text", e))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, AppError> {
        self.0
            .attribute(name)
            .await
            .map_err(|e| cdp_error(&format!("reading attribute {name}"), e))
    }

    async fn outer_html(&self) -> Result<String, AppError> {
        Ok(self
            .0
            .outer_html()
            .await
            .map_err(|e| cdp_error("reading outer HTML", e))?
            .unwrap_or_default())
    }
}
