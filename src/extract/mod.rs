//! Page parsing for the discovery flow
//!
//! Parsing is split from fetching: each stage fetches HTML through the run
//! context, then hands the text to a synchronous parser that owns the
//! document for the duration of the call only.

pub mod detail;
pub mod listing;
pub mod pagination;

pub use detail::{DetailInfo, enrich};
pub use listing::{ListingCard, ListingPage, fetch_listing};
pub use pagination::{PageCount, discover_page_count, page_urls};

use scraper::ElementRef;

/// Visible text of an element, trimmed
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
