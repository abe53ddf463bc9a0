//! Seams between the flows and the page-fetching machinery

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;

/// A stateful browser session that runs scripts and renders dynamic content.
///
/// Every call acts on the page most recently navigated to; nothing is cached
/// across navigations.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load `url` in the session's tab
    async fn navigate(&self, url: &str) -> Result<(), FetchError>;

    /// URL of the loaded page, after any redirect or client-side routing
    async fn current_url(&self) -> Result<String, FetchError>;

    /// Rendered HTML of the loaded page
    async fn content(&self) -> Result<String, FetchError>;

    /// Wait up to `timeout` for an element matching `selector`.
    ///
    /// # Returns
    /// * `bool` - Whether the element appeared before the timeout
    async fn wait_for(&self, selector: &str, timeout: Duration) -> bool;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> Result<(), FetchError>;

    /// Clear the first field matching `selector` and type `text` into it
    async fn fill(&self, selector: &str, text: &str) -> Result<(), FetchError>;

    /// Release the underlying browser. Later calls fail.
    async fn close(&self) -> Result<(), FetchError>;
}

/// A stateless fetcher for static pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw HTML body of `url`
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Lightweight existence check
    ///
    /// # Returns
    /// * `bool` - `true` only when the server answers `200 OK`
    async fn is_reachable(&self, url: &str) -> bool;
}
