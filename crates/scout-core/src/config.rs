use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::extract::LookupStrategy;
use crate::retry::RetryConfig;

/// Which card lookup path to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Query sub-elements through the driver when the session supports it.
    #[default]
    Element,
    /// Always parse an outer-HTML snapshot of each card.
    Snapshot,
}

impl ExtractionMode {
    /// Forced strategy, or `None` to follow the session's capabilities.
    pub fn forced_strategy(self) -> Option<LookupStrategy> {
        match self {
            ExtractionMode::Element => None,
            ExtractionMode::Snapshot => Some(LookupStrategy::HtmlSnapshot),
        }
    }
}

impl FromStr for ExtractionMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "element" => Ok(ExtractionMode::Element),
            "snapshot" => Ok(ExtractionMode::Snapshot),
            other => Err(AppError::ConfigError(format!(
                "Invalid SCOUT_EXTRACTION_MODE '{other}': expected 'element' or 'snapshot'"
            ))),
        }
    }
}

/// Browser and scraping-loop settings.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub headless: bool,
    pub nav_timeout: Duration,
    pub max_retries: u32,
    pub extraction_mode: ExtractionMode,
    pub chrome_bin: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            nav_timeout: Duration::from_secs(30),
            max_retries: 3,
            extraction_mode: ExtractionMode::Element,
            chrome_bin: None,
        }
    }
}

impl ScraperConfig {
    /// Read configuration from environment variables.
    ///
    /// - `SCOUT_HEADLESS` (optional, defaults to true)
    /// - `SCOUT_NAV_TIMEOUT_SECS` (optional, defaults to 30)
    /// - `SCOUT_MAX_RETRIES` (optional, defaults to 3, at least 1)
    /// - `SCOUT_EXTRACTION_MODE` (optional, `element` or `snapshot`)
    /// - `CHROME_BIN` (optional Chromium path)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let headless = match lookup("SCOUT_HEADLESS") {
            None => defaults.headless,
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::ConfigError(format!(
                    "Invalid SCOUT_HEADLESS '{raw}': expected true or false"
                ))
            })?,
        };

        let nav_timeout = match lookup("SCOUT_NAV_TIMEOUT_SECS") {
            None => defaults.nav_timeout,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid SCOUT_NAV_TIMEOUT_SECS '{raw}': must be a positive integer"
                    ))
                })?;
                if secs == 0 {
                    return Err(AppError::ConfigError(
                        "SCOUT_NAV_TIMEOUT_SECS must be at least 1".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
        };

        let max_retries = match lookup("SCOUT_MAX_RETRIES") {
            None => defaults.max_retries,
            Some(raw) => {
                let parsed: u32 = raw.trim().parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid SCOUT_MAX_RETRIES '{raw}': must be a positive integer"
                    ))
                })?;
                if parsed == 0 {
                    return Err(AppError::ConfigError(
                        "SCOUT_MAX_RETRIES must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        let extraction_mode = match lookup("SCOUT_EXTRACTION_MODE") {
            None => defaults.extraction_mode,
            Some(raw) => raw.parse()?,
        };

        let chrome_bin = lookup("CHROME_BIN")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            headless,
            nav_timeout,
            max_retries,
            extraction_mode,
            chrome_bin,
        })
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default().with_max_retries(self.max_retries)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
