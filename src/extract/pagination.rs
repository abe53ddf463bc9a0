use scraper::Html;
use tracing::{info, warn};
use url::Url;

use super::text_of;
use crate::context::RunContext;
use crate::error::ScrapeError;
use crate::selectors::{SelectorKey, SelectorRegistry};

const PAGE_PARAM: &str = "page";

/// Highest page index advertised by a listing's pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    Known(u32),
    Unknown,
}

impl PageCount {
    /// Number of pages to visit. Unknown means exactly one.
    pub fn pages(self) -> u32 {
        match self {
            Self::Known(n) => n.max(1),
            Self::Unknown => 1,
        }
    }
}

/// Read the maximum numeral among pagination items.
///
/// Items whose text is not a plain number (previous, next, ellipsis) are
/// ignored. A page without the control, or whose items carry no numeral,
/// yields [`PageCount::Unknown`].
pub fn max_page_number(html: &str, selectors: &SelectorRegistry) -> Result<PageCount, ScrapeError> {
    let container = selectors.selector(SelectorKey::PaginationContainer)?;
    let item = selectors.selector(SelectorKey::PaginationItem)?;
    let document = Html::parse_document(html);

    if document.select(&container).next().is_none() {
        return Ok(PageCount::Unknown);
    }

    let max = document
        .select(&item)
        .map(text_of)
        .filter(|text| !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|text| text.parse::<u32>().ok())
        .max();

    Ok(max.map_or(PageCount::Unknown, PageCount::Known))
}

/// Navigate to `url` and discover how many listing pages it has.
///
/// Never fails: timeouts, a missing control or a broken fetch are logged and
/// reported as [`PageCount::Unknown`].
pub async fn discover_page_count(ctx: &RunContext, url: &str) -> PageCount {
    let container = ctx.selectors.query(SelectorKey::PaginationContainer);

    if let Err(e) = ctx.browser.navigate(url).await {
        warn!(url, "Could not load listing for pagination: {}", e);
        return PageCount::Unknown;
    }

    if !ctx
        .browser
        .wait_for(container, ctx.config.timing.pagination_timeout)
        .await
    {
        warn!(
            url,
            selector_key = SelectorKey::PaginationContainer.code(),
            "Pagination control not found"
        );
        return PageCount::Unknown;
    }

    let html = match ctx.browser.content().await {
        Ok(html) => html,
        Err(e) => {
            warn!(url, "Could not read listing for pagination: {}", e);
            return PageCount::Unknown;
        }
    };

    match max_page_number(&html, &ctx.selectors) {
        Ok(count) => {
            info!(url, ?count, "Pagination discovered");
            count
        }
        Err(e) => {
            warn!(url, "Error retrieving pagination: {}", e);
            PageCount::Unknown
        }
    }
}

/// URL of page `page`, with the page-index query parameter set in place.
///
/// Only the `page` pair is rewritten; every other pair keeps its original
/// encoding. Without one, `page` is appended.
pub fn page_url(first_page: &Url, page: u32) -> Url {
    let page_pair = format!("{PAGE_PARAM}={page}");
    let mut replaced = false;

    let query = match first_page.query() {
        Some(raw) if !raw.is_empty() => {
            let mut pairs: Vec<&str> = Vec::new();
            for pair in raw.split('&') {
                let key = pair.split_once('=').map_or(pair, |(key, _)| key);
                if key == PAGE_PARAM {
                    replaced = true;
                    pairs.push(&page_pair);
                } else {
                    pairs.push(pair);
                }
            }
            if !replaced {
                pairs.push(&page_pair);
            }
            pairs.join("&")
        }
        _ => page_pair.clone(),
    };

    let mut url = first_page.clone();
    url.set_query(Some(&query));
    url
}

/// URLs of pages `1..=count.pages()`.
pub fn page_urls(first_page: &Url, count: PageCount) -> Vec<Url> {
    (1..=count.pages())
        .map(|page| page_url(first_page, page))
        .collect()
}
