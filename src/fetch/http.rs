use async_trait::async_trait;
use reqwest::{Client, StatusCode, redirect};
use tracing::debug;

use crate::error::FetchError;
use crate::traits::PageFetcher;

/// Stateless fetcher for static detail pages.
///
/// Page fetches follow redirects; the reachability probe does not, so a
/// moved page counts as unreachable.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    probe: Client,
}

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        let probe = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { client, probe })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    async fn is_reachable(&self, url: &str) -> bool {
        match self.probe.head(url).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!(url, "reachability probe failed: {}", e);
                false
            }
        }
    }
}
