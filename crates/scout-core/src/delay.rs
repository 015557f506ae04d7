//! Human-like pauses between browser actions.
//!
//! Every wait in a scrape goes through a [`DelayPolicy`] so tests can run the
//! whole navigator with [`NoDelay`].

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Inclusive range a randomized pause is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    pub const fn fixed(ms: u64) -> Self {
        Self::millis(ms, ms)
    }
}

pub const AFTER_OPEN: DelayRange = DelayRange::millis(1500, 3000);
pub const AFTER_CHALLENGE: DelayRange = DelayRange::millis(1000, 2000);
pub const AFTER_KEYWORD: DelayRange = DelayRange::millis(800, 1600);
pub const AFTER_LOCATION: DelayRange = DelayRange::millis(600, 1200);
pub const AFTER_SUBMIT: DelayRange = DelayRange::millis(2500, 4000);
pub const PAGE_SETTLE: DelayRange = DelayRange::fixed(2000);
pub const AFTER_NEXT_PAGE: DelayRange = DelayRange::millis(2500, 4500);
pub const RETRY_PAUSE: DelayRange = DelayRange::millis(1000, 2500);

/// Maps a delay range to a concrete pause.
pub trait DelayPolicy: Send + Sync + Clone {
    fn duration(&self, range: DelayRange) -> Duration;

    fn pause(&self, range: DelayRange) -> impl Future<Output = ()> + Send {
        let duration = self.duration(range);
        async move {
            if !duration.is_zero() {
                tracing::debug!(sleep_ms = %duration.as_millis(), "Pausing");
                tokio::time::sleep(duration).await;
            }
        }
    }
}

/// Uniformly random pause within the range.
#[derive(Debug, Default, Clone, Copy)]
pub struct HumanDelay;

impl DelayPolicy for HumanDelay {
    fn duration(&self, range: DelayRange) -> Duration {
        let min = range.min.as_millis() as u64;
        let max = range.max.as_millis() as u64;
        if max <= min {
            return range.min;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

/// Never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl DelayPolicy for NoDelay {
    fn duration(&self, _range: DelayRange) -> Duration {
        Duration::ZERO
    }
}
