use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use super::text_of;
use crate::context::RunContext;
use crate::error::ScrapeError;
use crate::models::DetailAttributes;
use crate::selectors::{SelectorKey, SelectorRegistry};

/// Data merged into a listing card from its detail and jobs pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailInfo {
    pub job_titles: Vec<String>,
    pub website_url: Option<String>,
    pub attributes: DetailAttributes,
}

/// Jobs sub-page candidate for a detail link: `<path>/jobs`, query kept.
pub fn jobs_url(link: &str) -> Option<String> {
    let mut url = Url::parse(link).ok()?;
    let path = format!("{}/jobs", url.path().trim_end_matches('/'));
    url.set_path(&path);
    Some(url.to_string())
}

pub fn parse_job_titles(html: &str, selectors: &SelectorRegistry) -> Result<Vec<String>, ScrapeError> {
    let job_selector = selectors.selector(SelectorKey::JobTitle)?;
    let document = Html::parse_document(html);

    Ok(document.select(&job_selector).map(text_of).collect())
}

/// Website link and title/content attribute blocks of a detail page.
///
/// Blocks missing either half are ignored.
pub fn parse_detail_page(
    html: &str,
    selectors: &SelectorRegistry,
) -> Result<(Option<String>, DetailAttributes), ScrapeError> {
    let website_selector = selectors.selector(SelectorKey::WebsiteLink)?;
    let block_selector = selectors.selector(SelectorKey::AttributeBlock)?;
    let title_selector = selectors.selector(SelectorKey::AttributeTitle)?;
    let content_selector = selectors.selector(SelectorKey::AttributeContent)?;

    let document = Html::parse_document(html);

    let website_url = document
        .select(&website_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    let mut attributes = DetailAttributes::default();
    for block in document.select(&block_selector) {
        let title = block.select(&title_selector).next().map(text_of);
        let content = block.select(&content_selector).next().map(text_of);
        if let (Some(title), Some(content)) = (title, content) {
            attributes.insert(&title, &content);
        }
    }

    Ok((website_url, attributes))
}

async fn fetch_job_titles(ctx: &RunContext, jobs_link: &str) -> Result<Vec<String>, ScrapeError> {
    ctx.browser.navigate(jobs_link).await?;
    ctx.pause(ctx.config.timing.jobs_settle).await;
    let html = ctx.browser.content().await?;
    parse_job_titles(&html, &ctx.selectors)
}

async fn fetch_detail_page(
    ctx: &RunContext,
    link: &str,
) -> Result<(Option<String>, DetailAttributes), ScrapeError> {
    let html = ctx.fetcher.fetch(link).await?;
    ctx.pause(ctx.config.timing.detail_settle).await;
    parse_detail_page(&html, &ctx.selectors)
}

/// Collect job titles, website and attributes for `company`.
///
/// The jobs sub-page is used when it answers, otherwise the detail link
/// itself is scanned for job titles. Each half degrades to empty on failure;
/// this never returns an error.
pub async fn enrich(ctx: &RunContext, company: &str, link: &str) -> DetailInfo {
    let candidate = jobs_url(link);
    let reachable = match &candidate {
        Some(url) => ctx.fetcher.is_reachable(url).await,
        None => false,
    };
    let jobs_link = match candidate {
        Some(url) if reachable => url,
        candidate => {
            debug!(company, ?candidate, "Jobs sub-page unreachable, using detail link");
            link.to_string()
        }
    };

    let job_titles = match fetch_job_titles(ctx, &jobs_link).await {
        Ok(titles) => titles,
        Err(e) => {
            warn!(company, url = %jobs_link, "Failed to read job titles: {}", e);
            Vec::new()
        }
    };

    let (website_url, attributes) = match fetch_detail_page(ctx, link).await {
        Ok(detail) => detail,
        Err(e) => {
            warn!(company, url = link, "Failed to read detail page: {}", e);
            (None, DetailAttributes::default())
        }
    };

    info!(
        company,
        jobs = job_titles.len(),
        attributes = !attributes.is_empty(),
        "Detail page enriched"
    );

    DetailInfo {
        job_titles,
        website_url,
        attributes,
    }
}
