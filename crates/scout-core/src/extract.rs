//! Field extraction from a single job card.
//!
//! Two lookup paths share the same selector chains:
//! - [`LookupStrategy::ElementQueries`] asks the driver for each sub-element,
//! - [`LookupStrategy::HtmlSnapshot`] reads the card's outer HTML once and
//!   evaluates the chains locally with `scraper`.
//!
//! A failed lookup on one selector never aborts the field; the next candidate
//! is tried and the field falls back to [`NOT_FOUND`].

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::AppError;
use crate::models::{JobRecord, NOT_FOUND};
use crate::selectors::{BASE_ORIGIN, COMPANY, LINK, LOCATION, SelectorChain, TITLE};
use crate::traits::{ElementHandle, SessionCapabilities};

/// How card fields are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    ElementQueries,
    HtmlSnapshot,
}

impl LookupStrategy {
    pub fn for_capabilities(capabilities: SessionCapabilities) -> Self {
        if capabilities.element_queries {
            LookupStrategy::ElementQueries
        } else {
            LookupStrategy::HtmlSnapshot
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Company,
    Location,
    Link,
}

impl Field {
    const ALL: [Field; 4] = [Field::Title, Field::Company, Field::Location, Field::Link];

    fn chain(self) -> SelectorChain {
        match self {
            Field::Title => TITLE,
            Field::Company => COMPANY,
            Field::Location => LOCATION,
            Field::Link => LINK,
        }
    }

    /// Attribute consulted before (or instead of) rendered text.
    fn attribute(self) -> Option<&'static str> {
        match self {
            Field::Title => Some("title"),
            Field::Link => Some("href"),
            Field::Company | Field::Location => None,
        }
    }

    fn reads_text(self) -> bool {
        !matches!(self, Field::Link)
    }
}

/// Builds [`JobRecord`]s from job-card element handles.
#[derive(Debug, Clone)]
pub struct JobExtractor {
    base: Url,
}

impl Default for JobExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl JobExtractor {
    pub fn new() -> Self {
        Self {
            base: Url::parse(BASE_ORIGIN).expect("BASE_ORIGIN is a valid URL"),
        }
    }

    /// Resolve relative links against `base` instead of the Indeed origin.
    pub fn with_base(base: Url) -> Self {
        Self { base }
    }

    /// Extract one card. Returns `None` when no usable title was found.
    pub async fn extract<E: ElementHandle>(
        &self,
        element: &E,
        index: usize,
        strategy: LookupStrategy,
    ) -> Option<JobRecord> {
        let [title, company, location, link] = match strategy {
            LookupStrategy::ElementQueries => {
                let mut values: [Option<String>; 4] = Default::default();
                for (slot, field) in values.iter_mut().zip(Field::ALL) {
                    *slot = self.query_field(element, field, index).await;
                }
                values
            }
            LookupStrategy::HtmlSnapshot => match element.outer_html().await {
                Ok(html) => snapshot_fields(&html, index),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Could not snapshot job card");
                    Default::default()
                }
            },
        };

        let record = JobRecord {
            title: title.unwrap_or_else(|| NOT_FOUND.to_string()),
            company: company.unwrap_or_else(|| NOT_FOUND.to_string()),
            location: location.unwrap_or_else(|| NOT_FOUND.to_string()),
            link: link
                .map(|href| self.normalize_link(&href))
                .unwrap_or_else(|| NOT_FOUND.to_string()),
        };

        if !record.has_valid_title() {
            tracing::warn!(index, title = %record.title, "Job card skipped: invalid title");
            return None;
        }

        tracing::debug!(index, title = %record.title, company = %record.company, "Job extracted");
        Some(record)
    }

    /// Absolute links pass through. Root-relative paths (including `//...`)
    /// get the base origin prepended verbatim; other relative paths are
    /// resolved against the base URL.
    pub fn normalize_link(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        let origin = self.base.origin().ascii_serialization();
        if href.starts_with('/') {
            return format!("{origin}{href}");
        }
        match self.base.join(href) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{origin}/{href}"),
        }
    }

    async fn query_field<E: ElementHandle>(
        &self,
        element: &E,
        field: Field,
        index: usize,
    ) -> Option<String> {
        for selector in field.chain().iter() {
            match lookup(element, field, selector).await {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(e) => tracing::debug!(index, error = %e, "Field lookup failed"),
            }
        }
        None
    }
}

/// Read `field` through one candidate selector. Driver failures are reported
/// as [`AppError::ExtractionError`] naming the field and selector.
async fn lookup<E: ElementHandle>(
    element: &E,
    field: Field,
    selector: &str,
) -> Result<Option<String>, AppError> {
    let extraction_error =
        |e: AppError| AppError::ExtractionError(format!("{} via {selector}: {e}", field.chain().target));
    let Some(found) = element.query(selector).await.map_err(extraction_error)? else {
        return Ok(None);
    };
    read_value(&found, field).await.map_err(extraction_error)
}

async fn read_value<E: ElementHandle>(element: &E, field: Field) -> Result<Option<String>, AppError> {
    if let Some(name) = field.attribute()
        && let Some(value) = non_empty(element.attribute(name).await?)
    {
        return Ok(Some(value));
    }
    if field.reads_text() {
        return Ok(non_empty(element.text().await?));
    }
    Ok(None)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Evaluate every field chain against a parsed copy of the card.
fn snapshot_fields(html: &str, index: usize) -> [Option<String>; 4] {
    let fragment = Html::parse_fragment(html);
    let mut values: [Option<String>; 4] = Default::default();
    for (slot, field) in values.iter_mut().zip(Field::ALL) {
        *slot = field.chain().iter().find_map(|raw| {
            let selector = match Selector::parse(raw) {
                Ok(selector) => selector,
                Err(e) => {
                    tracing::debug!(index, selector = raw, error = %e, "Unparseable selector");
                    return None;
                }
            };
            fragment
                .select(&selector)
                .next()
                .and_then(|node| snapshot_value(node, field))
        });
    }
    values
}

fn snapshot_value(node: ElementRef<'_>, field: Field) -> Option<String> {
    if let Some(name) = field.attribute()
        && let Some(value) = non_empty(node.value().attr(name).map(str::to_string))
    {
        return Some(value);
    }
    if field.reads_text() {
        let text = node.text().collect::<Vec<_>>().join(" ");
        return non_empty(Some(text.split_whitespace().collect::<Vec<_>>().join(" ")));
    }
    None
}
