//! Core data types for normalized catalog listings.

use std::time::Duration;

use serde::Serialize;

/// Author value used when a listing carries no author.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// A book listing normalized from one catalog's search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    title: String,
    author: String,
    url: Option<String>,
    cover: Option<String>,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl BookRecord {
    /// Build a record from raw extracted text.
    ///
    /// Returns `None` when the title is empty after trimming. A blank
    /// author becomes [`UNKNOWN_AUTHOR`] and a blank description is dropped.
    pub fn new(
        title: &str,
        author: Option<&str>,
        url: Option<String>,
        cover: Option<String>,
        source: &str,
    ) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let author = author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR);

        Some(Self {
            title: title.to_string(),
            author: author.to_string(),
            url,
            cover,
            source: source.to_string(),
            description: None,
        })
    }

    /// Attach a description, ignoring blank text.
    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Errors produced by catalog queries and downloads.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Timed out after {after:?} waiting for {url}")]
    Timeout { url: String, after: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Invalid selection '{input}': expected a number between 1 and {count}")]
    InvalidSelection { input: String, count: usize },

    #[error("No download link for \"{0}\"")]
    MissingUrl(String),
}

impl From<url::ParseError> for ScoutError {
    fn from(e: url::ParseError) -> Self {
        ScoutError::InvalidUrl(e.to_string())
    }
}

pub type ScoutResult<T> = Result<T, ScoutError>;
