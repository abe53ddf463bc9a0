use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use super::text_of;
use crate::context::RunContext;
use crate::error::ScrapeError;
use crate::selectors::{SelectorKey, SelectorRegistry};

/// Summary fields read from one company card on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCard {
    pub name: String,
    pub domain: Option<String>,
    pub location: Option<String>,
    pub offer_text: Option<String>,
    /// Detail-page link, resolved against the site's base URL
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub cards: Vec<ListingCard>,
    /// Cards dropped because they had no name
    pub skipped: usize,
}

/// The card details list as rendered by the site.
///
/// The site renders a fixed sequence of facts per card with the domain third
/// from last and the location second from last. Nothing in the markup labels
/// them, so a change in that ordering silently shifts both fields.
struct CardDetails(Vec<String>);

impl CardDetails {
    fn from_end(&self, offset: usize) -> Option<String> {
        let index = self.0.len().checked_sub(offset)?;
        self.0.get(index).filter(|text| !text.is_empty()).cloned()
    }

    fn domain(&self) -> Option<String> {
        self.from_end(3)
    }

    fn location(&self) -> Option<String> {
        self.from_end(2)
    }
}

/// Split a listing page into company cards.
///
/// A card without a name is logged and skipped; the rest of the page is
/// still read.
pub fn parse_listing(
    html: &str,
    selectors: &SelectorRegistry,
    base_url: &Url,
    page_url: &str,
) -> Result<ListingPage, ScrapeError> {
    let card_selector = selectors.selector(SelectorKey::CompanyCard)?;
    let name_selector = selectors.selector(SelectorKey::CompanyName)?;
    let details_selector = selectors.selector(SelectorKey::CompanyDetails)?;
    let offer_selector = selectors.selector(SelectorKey::OfferCount)?;
    let link_selector = selectors.selector(SelectorKey::CompanyLink)?;

    let document = Html::parse_document(html);
    let mut page = ListingPage::default();

    for (index, card) in document.select(&card_selector).enumerate() {
        let Some(name) = card
            .select(&name_selector)
            .next()
            .map(text_of)
            .filter(|name| !name.is_empty())
        else {
            warn!(
                page = page_url,
                card = index,
                selector_key = SelectorKey::CompanyName.code(),
                "Company card has no name, skipping"
            );
            page.skipped += 1;
            continue;
        };

        let details = CardDetails(card.select(&details_selector).map(text_of).collect());

        let offer_text = card
            .select(&offer_selector)
            .next()
            .map(text_of);

        let link = card
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| match base_url.join(href) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    warn!(company = %name, href, "Unresolvable detail link: {}", e);
                    None
                }
            });

        if link.is_none() {
            debug!(company = %name, "Company card has no detail link");
        }

        page.cards.push(ListingCard {
            domain: details.domain(),
            location: details.location(),
            name,
            offer_text,
            link,
        });
    }

    Ok(page)
}

/// Load a listing page in the browser, let it render, and parse its cards.
pub async fn fetch_listing(ctx: &RunContext, page_url: &str) -> Result<ListingPage, ScrapeError> {
    ctx.browser.navigate(page_url).await?;
    ctx.pause(ctx.config.timing.listing_settle).await;
    let html = ctx.browser.content().await?;

    let page = parse_listing(&html, &ctx.selectors, &ctx.config.base_url, page_url)?;
    info!(
        page = page_url,
        cards = page.cards.len(),
        skipped = page.skipped,
        "Listing page parsed"
    );
    Ok(page)
}
