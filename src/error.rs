//! Error types shared across the scraping and application flows

use thiserror::Error;

use crate::selectors::SelectorKey;

/// Failure reported by a page fetcher or browser session.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("browser error: {0}")]
    Browser(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network {
            url: err.url().map(ToString::to_string).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

/// Structural failures that abort a whole run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("required element {key} (`{selector}`) missing on {url}")]
    MissingElement {
        key: SelectorKey,
        selector: String,
        url: String,
    },

    #[error("page fetcher unavailable: {0}")]
    FetcherUnavailable(String),

    #[error("invalid selector {key} (`{selector}`)")]
    InvalidSelector { key: SelectorKey, selector: String },

    #[error("missing credential `{0}`")]
    MissingCredential(&'static str),

    #[error("cannot derive a page from `{0}`")]
    InvalidLink(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// A configuration value that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL in {key}: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid number in {key}: `{value}`")]
    InvalidNumber { key: &'static str, value: String },

    #[error("invalid boolean in {key}: `{value}`")]
    InvalidBool { key: &'static str, value: String },
}

/// Raw listing data that cannot become a [`crate::models::Company`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("company name is empty")]
    MissingName,
}
