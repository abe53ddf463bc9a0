//! Integer-keyed CSS queries for the directory site
//!
//! Extraction code only ever refers to a [`SelectorKey`]; when the site markup
//! changes, this table is the single place to update.

use std::collections::BTreeMap;
use std::fmt;

use scraper::Selector;

use crate::error::ScrapeError;

/// Stable key of a structured-document query. The discriminant is the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SelectorKey {
    SectorFilter = 1,
    SectorOption = 2,
    SectorCheckbox = 3,
    SearchButton = 4,
    PaginationContainer = 5,
    PaginationItem = 6,
    CompanyCard = 7,
    CompanyName = 8,
    CompanyDetails = 9,
    OfferCount = 10,
    CompanyLink = 11,
    WebsiteLink = 12,
    AttributeBlock = 13,
    AttributeTitle = 14,
    AttributeContent = 15,
    JobTitle = 16,
    LoginSubmit = 17,
    LoginEmail = 18,
    LoginPassword = 19,
    ApplyButton = 20,
    CoverLetter = 21,
    SubmitApplication = 22,
    ConfirmApplication = 23,
}

impl SelectorKey {
    pub const ALL: [SelectorKey; 23] = [
        Self::SectorFilter,
        Self::SectorOption,
        Self::SectorCheckbox,
        Self::SearchButton,
        Self::PaginationContainer,
        Self::PaginationItem,
        Self::CompanyCard,
        Self::CompanyName,
        Self::CompanyDetails,
        Self::OfferCount,
        Self::CompanyLink,
        Self::WebsiteLink,
        Self::AttributeBlock,
        Self::AttributeTitle,
        Self::AttributeContent,
        Self::JobTitle,
        Self::LoginSubmit,
        Self::LoginEmail,
        Self::LoginPassword,
        Self::ApplyButton,
        Self::CoverLetter,
        Self::SubmitApplication,
        Self::ConfirmApplication,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SelectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({:?})", self.code(), self)
    }
}

const PAGINATION_NAV: &str = "[data-testid='companies-search-pagination'] nav ul";

fn default_query(key: SelectorKey) -> String {
    let query = match key {
        SelectorKey::SectorFilter => "header[data-testid='companies-search-search-widget-sectors']",
        SelectorKey::SectorOption => {
            "span[data-testid='companies-search-search-widgets-sectors_name-19-trigger']"
        }
        SelectorKey::SectorCheckbox => "input[type='checkbox']",
        SelectorKey::SearchButton => "button[type='submit'].sc-bkUKrm",
        SelectorKey::PaginationContainer => PAGINATION_NAV,
        SelectorKey::PaginationItem => {
            return format!("{PAGINATION_NAV} li");
        }
        SelectorKey::CompanyCard => {
            "article[data-role='companies:thumb'][data-testid='company-card']"
        }
        SelectorKey::CompanyName => "div header a span",
        SelectorKey::CompanyDetails => "ul li",
        SelectorKey::OfferCount => "footer a span",
        SelectorKey::CompanyLink => "a",
        SelectorKey::WebsiteLink => "div div p a",
        SelectorKey::AttributeBlock => {
            "div.sc-iqrLza.hGwRdy.showcase-block.block.block-span-1 div div section"
        }
        SelectorKey::AttributeTitle => "h4",
        SelectorKey::AttributeContent => "span",
        SelectorKey::JobTitle => "div div a h4",
        SelectorKey::LoginSubmit => "button[data-testid='login-button-submit']",
        SelectorKey::LoginEmail => "input[data-testid='login-field-email']",
        SelectorKey::LoginPassword => "input[data-testid='login-field-password']",
        SelectorKey::ApplyButton => "a[data-testid='company_jobs-button-spontaneous-application']",
        SelectorKey::CoverLetter => "textarea[name='cover_letter']",
        SelectorKey::SubmitApplication => "button[data-testid='apply-form-submit']",
        SelectorKey::ConfirmApplication => "button[data-testid='apply-form-confirm']",
    };
    query.to_string()
}

/// Immutable key → query table used for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct SelectorRegistry {
    queries: BTreeMap<SelectorKey, String>,
}

impl SelectorRegistry {
    /// Build a registry from explicit entries. Every key must be present.
    pub fn from_entries<I>(entries: I) -> Result<Self, SelectorKey>
    where
        I: IntoIterator<Item = (SelectorKey, String)>,
    {
        let queries: BTreeMap<_, _> = entries.into_iter().collect();
        if let Some(missing) = SelectorKey::ALL.iter().find(|key| !queries.contains_key(*key)) {
            return Err(*missing);
        }
        Ok(Self { queries })
    }

    /// Query text for `key`.
    ///
    /// Construction guarantees every key is present, so a miss here is a
    /// broken invariant rather than a data error.
    pub fn query(&self, key: SelectorKey) -> &str {
        &self.queries[&key]
    }

    /// `inner` scoped as a descendant of `outer`.
    pub fn scoped(&self, outer: SelectorKey, inner: SelectorKey) -> String {
        format!("{} {}", self.query(outer), self.query(inner))
    }

    /// Parsed selector for `key`.
    pub fn selector(&self, key: SelectorKey) -> Result<Selector, ScrapeError> {
        let query = self.query(key);
        Selector::parse(query).map_err(|_| ScrapeError::InvalidSelector {
            key,
            selector: query.to_string(),
        })
    }
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        Self {
            queries: SelectorKey::ALL
                .iter()
                .map(|&key| (key, default_query(key)))
                .collect(),
        }
    }
}
