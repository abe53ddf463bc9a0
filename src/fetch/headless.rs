use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::traits::BrowserSession;

const CLICK_FN: &str = "function() { this.click(); }";
const CLEAR_FN: &str = "function() { this.value = ''; }";

/// Chrome session driven over the DevTools protocol.
///
/// The driver API is blocking, so each call runs on the blocking pool with a
/// shared handle to the single tab. Dropping the session kills the browser.
pub struct HeadlessBrowser {
    browser: Mutex<Option<Browser>>,
    tab: Mutex<Option<Arc<Tab>>>,
}

impl HeadlessBrowser {
    pub fn launch(headless: bool) -> Result<Self, FetchError> {
        let options = LaunchOptionsBuilder::default()
            .headless(headless)
            .build()
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| FetchError::Browser(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        info!(headless, "Browser session started");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            tab: Mutex::new(Some(tab)),
        })
    }

    fn tab(&self) -> Result<Arc<Tab>, FetchError> {
        self.tab
            .lock()
            .map_err(|_| FetchError::Browser("tab lock poisoned".to_string()))?
            .clone()
            .ok_or_else(|| FetchError::Browser("browser session closed".to_string()))
    }

    async fn with_tab<T, F>(&self, op: F) -> Result<T, FetchError>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> anyhow::Result<T> + Send + 'static,
    {
        let tab = self.tab()?;
        tokio::task::spawn_blocking(move || op(tab.as_ref()))
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?
            .map_err(|e| FetchError::Browser(e.to_string()))
    }
}

#[async_trait]
impl BrowserSession for HeadlessBrowser {
    async fn navigate(&self, url: &str) -> Result<(), FetchError> {
        let url = url.to_string();
        self.with_tab(move |tab| {
            tab.navigate_to(&url)?.wait_until_navigated()?;
            Ok(())
        })
        .await
    }

    async fn current_url(&self) -> Result<String, FetchError> {
        self.with_tab(|tab| Ok(tab.get_url())).await
    }

    async fn content(&self) -> Result<String, FetchError> {
        self.with_tab(|tab| tab.get_content()).await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> bool {
        let query = selector.to_string();
        let found = self
            .with_tab(move |tab| {
                tab.wait_for_element_with_custom_timeout(&query, timeout)?;
                Ok(())
            })
            .await;

        match found {
            Ok(()) => true,
            Err(e) => {
                debug!(selector, "element did not appear: {}", e);
                false
            }
        }
    }

    async fn click(&self, selector: &str) -> Result<(), FetchError> {
        let query = selector.to_string();
        self.with_tab(move |tab| {
            tab.find_element(&query)?.call_js_fn(CLICK_FN, vec![], false)?;
            Ok(())
        })
        .await
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), FetchError> {
        let query = selector.to_string();
        let text = text.to_string();
        self.with_tab(move |tab| {
            let field = tab.find_element(&query)?;
            field.call_js_fn(CLEAR_FN, vec![], false)?;
            field.click()?;
            field.type_into(&text)?;
            Ok(())
        })
        .await
    }

    async fn close(&self) -> Result<(), FetchError> {
        let tab = self
            .tab
            .lock()
            .map_err(|_| FetchError::Browser("tab lock poisoned".to_string()))?
            .take();
        let browser = self
            .browser
            .lock()
            .map_err(|_| FetchError::Browser("browser lock poisoned".to_string()))?
            .take();

        if let Some(tab) = tab
            && let Err(e) = tab.close(false)
        {
            debug!("closing tab failed: {}", e);
        }
        if browser.is_some() {
            info!("Browser session released");
        }
        Ok(())
    }
}
