//! Retry-wrapped element selection.
//!
//! ```text
//! Attempt(1) --[found]--> return elements
//!     |
//!  [empty / error]
//!     v
//! Recover(1): pause -> recovery actions -> backoff(1)
//!     |
//! Attempt(2) ... Attempt(max) --[empty / error]--> Exhausted -> return []
//! ```
//!
//! Exhaustion is reported as an empty result so callers can fall through to
//! the next selector candidate.

use std::time::Duration;

use crate::delay::{DelayPolicy, DelayRange, RETRY_PAUSE};
use crate::error::AppError;
use crate::traits::BrowserSession;

/// Best-effort action run between attempts to coax lazy content into the DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    ScrollToBottom,
    /// Re-open the current URL.
    SoftReload,
}

/// Retry budget and recovery behaviour for one selection.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_retries: u32,
    /// Linear backoff unit: attempt `n` is followed by `backoff_factor * n`.
    pub backoff_factor: Duration,
    /// Randomized pause taken before the recovery actions.
    pub pause: DelayRange,
    pub recovery: Vec<RecoveryAction>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_millis(1200),
            pause: RETRY_PAUSE,
            recovery: vec![RecoveryAction::ScrollToBottom, RecoveryAction::SoftReload],
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_factor(mut self, factor: Duration) -> Self {
        self.backoff_factor = factor;
        self
    }

    pub fn with_recovery(mut self, recovery: Vec<RecoveryAction>) -> Self {
        self.recovery = recovery;
        self
    }

    /// Backoff slept after the failed attempt `attempt` (1-indexed).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_factor * attempt
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// What a retry-wrapped selection produced.
#[derive(Debug)]
pub struct SelectOutcome<E> {
    /// Empty when every attempt came back empty or failed.
    pub elements: Vec<E>,
    pub attempts: u32,
    /// Attempts that ended in a driver error rather than an empty match.
    pub failures: u32,
}

enum RetryState {
    Attempt(u32),
    Recover(u32),
    Exhausted(u32),
}

/// Select all elements matching `selector`, retrying with recovery in between.
pub async fn select_all_with_retries<S, D>(
    session: &S,
    selector: &str,
    config: &RetryConfig,
    delay: &D,
) -> SelectOutcome<S::Element>
where
    S: BrowserSession,
    D: DelayPolicy,
{
    let max = config.attempts();
    let mut failures = 0;
    let mut state = RetryState::Attempt(1);

    loop {
        state = match state {
            RetryState::Attempt(attempt) => {
                tracing::debug!(selector, attempt, max, "Selecting elements");
                match session.select_all(selector).await {
                    Ok(elements) if !elements.is_empty() => {
                        tracing::debug!(selector, attempt, count = elements.len(), "Elements found");
                        return SelectOutcome {
                            elements,
                            attempts: attempt,
                            failures,
                        };
                    }
                    Ok(_) => {
                        tracing::debug!(selector, attempt, "No elements matched");
                    }
                    Err(e) => {
                        failures += 1;
                        tracing::warn!(selector, attempt, error = %e, "Select attempt failed");
                    }
                }
                if attempt < max {
                    RetryState::Recover(attempt)
                } else {
                    RetryState::Exhausted(attempt)
                }
            }
            RetryState::Recover(attempt) => {
                delay.pause(config.pause).await;
                for action in &config.recovery {
                    if let Err(e) = run_recovery(session, *action).await {
                        tracing::debug!(selector, attempt, ?action, error = %e, "Recovery action failed");
                    }
                }
                let backoff = config.backoff_for_attempt(attempt);
                if !backoff.is_zero() {
                    tracing::debug!(selector, attempt, backoff_ms = %backoff.as_millis(), "Backing off");
                    tokio::time::sleep(backoff).await;
                }
                RetryState::Attempt(attempt + 1)
            }
            RetryState::Exhausted(attempts) => {
                tracing::debug!(selector, attempts, "Selection retries exhausted");
                return SelectOutcome {
                    elements: Vec::new(),
                    attempts,
                    failures,
                };
            }
        };
    }
}

async fn run_recovery<S: BrowserSession>(session: &S, action: RecoveryAction) -> Result<(), AppError> {
    match action {
        RecoveryAction::ScrollToBottom => session.scroll_to_bottom().await,
        RecoveryAction::SoftReload => {
            let url = session.current_url().await?;
            session.open(&url).await
        }
    }
}
