#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use company_scraper::config::{Config, Credentials, Timing};
use company_scraper::context::RunContext;
use company_scraper::error::FetchError;
use company_scraper::selectors::SelectorRegistry;
use company_scraper::traits::{BrowserSession, PageFetcher};

pub const BASE: &str = "https://www.welcometothejungle.com/";

#[derive(Default)]
struct BrowserState {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    current: Option<String>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    closed: bool,
}

/// In-memory browser: serves canned pages and answers element queries with
/// the same CSS engine the parsers use.
#[derive(Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<BrowserState>>,
}

impl FakeBrowser {
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), html.into());
        self
    }

    /// Clicking `selector` loads `url`.
    pub fn on_click(self, selector: &str, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .redirects
            .insert(selector.to_string(), url.to_string());
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().fills.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn has_element(&self, selector: &str) -> bool {
        let state = self.state.lock().unwrap();
        let Some(html) = state.current.as_ref().and_then(|url| state.pages.get(url)) else {
            return false;
        };
        let Ok(selector) = Selector::parse(selector) else {
            return false;
        };
        Html::parse_document(html).select(&selector).next().is_some()
    }

    fn ensure_open(&self) -> Result<(), FetchError> {
        if self.state.lock().unwrap().closed {
            return Err(FetchError::Browser("session closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<(), FetchError> {
        self.ensure_open()?;
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        if !state.pages.contains_key(url) {
            return Err(FetchError::Network {
                url: url.to_string(),
                message: "no such page".to_string(),
            });
        }
        state.current = Some(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, FetchError> {
        self.ensure_open()?;
        Ok(self.state.lock().unwrap().current.clone().unwrap_or_default())
    }

    async fn content(&self) -> Result<String, FetchError> {
        self.ensure_open()?;
        let state = self.state.lock().unwrap();
        state
            .current
            .as_ref()
            .and_then(|url| state.pages.get(url))
            .cloned()
            .ok_or_else(|| FetchError::Browser("nothing loaded".to_string()))
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> bool {
        self.ensure_open().is_ok() && self.has_element(selector)
    }

    async fn click(&self, selector: &str) -> Result<(), FetchError> {
        self.ensure_open()?;
        if !self.has_element(selector) {
            return Err(FetchError::Browser(format!("no element {selector}")));
        }
        let mut state = self.state.lock().unwrap();
        state.clicks.push(selector.to_string());
        if let Some(target) = state.redirects.get(selector).cloned() {
            state.navigations.push(target.clone());
            state.current = Some(target);
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), FetchError> {
        self.ensure_open()?;
        if !self.has_element(selector) {
            return Err(FetchError::Browser(format!("no element {selector}")));
        }
        self.state
            .lock()
            .unwrap()
            .fills
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn close(&self) -> Result<(), FetchError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

#[derive(Default)]
struct FetcherState {
    pages: HashMap<String, String>,
    reachable: HashSet<String>,
    fetched: Vec<String>,
}

/// In-memory static fetcher.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    state: Arc<Mutex<FetcherState>>,
}

impl FakeFetcher {
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), html.into());
        self
    }

    pub fn reachable(self, url: &str) -> Self {
        self.state.lock().unwrap().reachable.insert(url.to_string());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.state.lock().unwrap().fetched.clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut state = self.state.lock().unwrap();
        state.fetched.push(url.to_string());
        state.pages.get(url).cloned().ok_or(FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }

    async fn is_reachable(&self, url: &str) -> bool {
        self.state.lock().unwrap().reachable.contains(url)
    }
}

/// Default configuration with every file under `dir` and no delays.
pub fn config(dir: &Path) -> Config {
    let mut config = Config::from_lookup(|_| None).expect("default config");
    config.json_file = dir.join("data.json");
    config.db_file = dir.join("data.db");
    config.fallback_json_file = dir.join("fallback/data.json");
    config.fallback_db_file = dir.join("fallback/data.db");
    config.log_file = dir.join("sites.log");
    config.applied_file = dir.join("applied.txt");
    config.timing = Timing::immediate();
    config.credentials = Some(Credentials {
        email: "me@example.test".to_string(),
        password: "secret".to_string(),
    });
    config
}

pub fn context(browser: &FakeBrowser, fetcher: &FakeFetcher, config: Config) -> RunContext {
    RunContext::new(
        Box::new(browser.clone()),
        Box::new(fetcher.clone()),
        SelectorRegistry::default(),
        config,
    )
}

pub fn url(path: &str) -> String {
    format!("{BASE}{}", path.trim_start_matches('/'))
}

pub fn page(body: &str) -> String {
    format!("<html><body>{body}</body></html>")
}

pub fn company_card(name: Option<&str>, domain: &str, location: &str, offers: &str, href: &str) -> String {
    let name = name
        .map(|n| format!("<div><header><a href=\"{href}\"><span>{n}</span></a></header></div>"))
        .unwrap_or_default();
    format!(
        "<article data-role=\"companies:thumb\" data-testid=\"company-card\">\
         <a href=\"{href}\"><img alt=\"logo\"></a>{name}\
         <ul><li>Featured</li><li>{domain}</li><li>{location}</li><li>120 salariés</li></ul>\
         <footer><a href=\"{href}\"><span>{offers}</span></a></footer></article>"
    )
}

pub fn pagination(items: &[&str]) -> String {
    let items: String = items
        .iter()
        .map(|text| format!("<li><a href=\"#\">{text}</a></li>"))
        .collect();
    format!("<div data-testid=\"companies-search-pagination\"><nav><ul>{items}</ul></nav></div>")
}

pub fn job_titles(titles: &[&str]) -> String {
    let jobs: String = titles
        .iter()
        .map(|title| format!("<div><a href=\"#\"><h4>{title}</h4></a></div>"))
        .collect();
    page(&format!("<div>{jobs}</div>"))
}

pub fn detail_page(website: &str, attributes: &[(&str, &str)]) -> String {
    let blocks: String = attributes
        .iter()
        .map(|(title, content)| format!("<section><h4>{title}</h4><span>{content}</span></section>"))
        .collect();
    page(&format!(
        "<div><div><p><a href=\"{website}\">Site</a></p></div></div>\
         <div class=\"sc-iqrLza hGwRdy showcase-block block block-span-1\"><div><div>{blocks}</div></div></div>"
    ))
}
