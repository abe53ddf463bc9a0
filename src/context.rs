use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ScrapeError;
use crate::fetch::{HeadlessBrowser, HttpFetcher};
use crate::selectors::{SelectorKey, SelectorRegistry};
use crate::traits::{BrowserSession, PageFetcher};

/// Handles shared by every component of one orchestrator run.
///
/// The browser session is the only mutable shared resource; components take
/// turns on it and never hold a document across a navigation.
pub struct RunContext {
    pub browser: Box<dyn BrowserSession>,
    pub fetcher: Box<dyn PageFetcher>,
    pub selectors: SelectorRegistry,
    pub config: Config,
}

impl RunContext {
    pub fn new(
        browser: Box<dyn BrowserSession>,
        fetcher: Box<dyn PageFetcher>,
        selectors: SelectorRegistry,
        config: Config,
    ) -> Self {
        Self {
            browser,
            fetcher,
            selectors,
            config,
        }
    }

    /// Start a headless Chrome session and an HTTP client for `config`.
    pub fn launch(config: Config) -> Result<Self, ScrapeError> {
        let browser = HeadlessBrowser::launch(config.headless)
            .map_err(|e| ScrapeError::FetcherUnavailable(e.to_string()))?;
        let fetcher =
            HttpFetcher::new().map_err(|e| ScrapeError::FetcherUnavailable(e.to_string()))?;

        Ok(Self::new(
            Box::new(browser),
            Box::new(fetcher),
            SelectorRegistry::default(),
            config,
        ))
    }

    /// Release the browser session. Call on every exit path.
    pub async fn close(self) {
        match self.browser.close().await {
            Ok(()) => info!("Page fetcher session closed"),
            Err(e) => warn!("Failed to close browser session: {}", e),
        }
    }

    /// Fixed settle or throttle delay
    pub async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Wait for `query` (registered under `key`) on the loaded page.
    ///
    /// # Returns
    /// * `Result<(), ScrapeError>` - `MissingElement` naming the key and page on timeout
    pub async fn require(&self, key: SelectorKey, query: &str) -> Result<(), ScrapeError> {
        if self
            .browser
            .wait_for(query, self.config.timing.element_timeout)
            .await
        {
            return Ok(());
        }

        let url = self.browser.current_url().await.unwrap_or_default();
        error!(selector_key = key.code(), selector = query, url = %url, "Element not found");
        Err(ScrapeError::MissingElement {
            key,
            selector: query.to_string(),
            url,
        })
    }

    /// Wait for `query`, let the page settle, then click it.
    pub async fn click_required(&self, key: SelectorKey, query: &str) -> Result<(), ScrapeError> {
        self.require(key, query).await?;
        self.pause(self.config.timing.before_click).await;
        self.browser.click(query).await?;
        Ok(())
    }

    /// [`Self::click_required`] with the registered query for `key`.
    pub async fn click_key(&self, key: SelectorKey) -> Result<(), ScrapeError> {
        let query = self.selectors.query(key).to_string();
        self.click_required(key, &query).await
    }
}
