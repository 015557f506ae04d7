use thiserror::Error;

/// Application-wide error types for Scout.
#[derive(Error, Debug)]
pub enum AppError {
    /// Caller input rejected before any browser interaction.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Opening the site or filling/submitting the search form failed.
    #[error("Search setup failed: {0}")]
    SearchSetupError(String),

    /// No candidate of a selector chain matched within the retry budget.
    #[error("No elements matched {selector} after {attempts} attempts")]
    SelectionTimeout { selector: String, attempts: u32 },

    /// A single field could not be read from a job card. Isolated to that
    /// selector; the field falls back to the next candidate.
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// Encoding a download (CSV, XLSX, JSON) failed.
    #[error("Export error: {0}")]
    ExportError(String),

    /// The browser driver reported an error (launch, navigation, DOM access).
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Navigation timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}
