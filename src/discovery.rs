//! Discovery flow: filter the directory, walk every listing page, enrich
//! each card and persist the result

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use url::Url;

use crate::context::RunContext;
use crate::database::{Database, JsonStore};
use crate::error::{BuildError, ScrapeError};
use crate::extract::{
    DetailInfo, ListingCard, discover_page_count, enrich, fetch_listing, page_urls,
};
use crate::models::{Company, RawCompany};
use crate::selectors::SelectorKey;

/// Aggregate counts reported at the end of a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub pages_total: u32,
    pub pages_processed: u32,
    pub cards_skipped: usize,
    pub companies: usize,
    /// Entries in the JSON document after the merge, if it was written
    pub json_entries: Option<usize>,
    /// Rows inserted into the database, if the insert batch committed
    pub rows_inserted: Option<u64>,
    /// Where the JSON document was written: configured or fallback path
    pub json_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
}

pub struct CompanyFinder<'a> {
    ctx: &'a RunContext,
}

impl<'a> CompanyFinder<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    /// Scrape every page and persist the companies found.
    ///
    /// Only a missing filter control or an unusable page fetcher is an error;
    /// card, page and sink failures are logged and reflected in the report.
    pub async fn run(&self) -> Result<DiscoveryReport, ScrapeError> {
        let (companies, mut report) = self.discover().await?;
        self.persist(&companies, &mut report).await;
        Ok(report)
    }

    /// Scrape without persisting.
    pub async fn discover(&self) -> Result<(Vec<Company>, DiscoveryReport), ScrapeError> {
        let first_page = self.apply_sector_filter().await?;
        info!(url = %first_page, "Sector filter applied");

        let count = discover_page_count(self.ctx, first_page.as_str()).await;
        let pages = page_urls(&first_page, count);
        info!(pages = pages.len(), "Number of pages found");

        let mut report = DiscoveryReport {
            pages_total: count.pages(),
            ..DiscoveryReport::default()
        };
        let mut companies = Vec::new();

        for page in &pages {
            info!(page = %page, "Processing page");
            let listing = match fetch_listing(self.ctx, page.as_str()).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(page = %page, "Listing page failed: {}", e);
                    continue;
                }
            };

            report.pages_processed += 1;
            report.cards_skipped += listing.skipped;

            for card in listing.cards {
                let name = card.name.clone();
                match self.collect_company(card).await {
                    Ok(company) => companies.push(company),
                    Err(e) => {
                        warn!(company = %name, "Company record not built: {}", e);
                        report.cards_skipped += 1;
                    }
                }
                self.ctx.pause(self.ctx.config.timing.between_cards).await;
            }
        }

        if report.pages_processed == 0 {
            return Err(ScrapeError::FetcherUnavailable(format!(
                "none of the {} listing pages could be loaded",
                pages.len()
            )));
        }

        report.companies = companies.len();
        info!(
            pages = report.pages_processed,
            companies = report.companies,
            skipped = report.cards_skipped,
            "Discovery finished"
        );
        Ok((companies, report))
    }

    /// Open the sector filter, tick the target sector and submit.
    ///
    /// Every later page depends on this filter, so a missing control aborts
    /// the run.
    async fn apply_sector_filter(&self) -> Result<Url, ScrapeError> {
        let ctx = self.ctx;
        let companies_url = ctx.config.companies_url.as_str();

        info!(url = companies_url, "Accessing companies URL");
        ctx.browser
            .navigate(companies_url)
            .await
            .map_err(|e| ScrapeError::FetcherUnavailable(e.to_string()))?;

        ctx.click_key(SelectorKey::SectorFilter).await?;

        let checkbox = ctx
            .selectors
            .scoped(SelectorKey::SectorOption, SelectorKey::SectorCheckbox);
        ctx.click_required(SelectorKey::SectorCheckbox, &checkbox)
            .await?;

        ctx.click_key(SelectorKey::SearchButton).await?;

        let current = ctx.browser.current_url().await?;
        Url::parse(&current).map_err(|e| {
            ScrapeError::FetcherUnavailable(format!("filtered listing URL `{current}`: {e}"))
        })
    }

    async fn collect_company(&self, card: ListingCard) -> Result<Company, BuildError> {
        let detail = match &card.link {
            Some(link) => enrich(self.ctx, &card.name, link).await,
            None => DetailInfo::default(),
        };

        Company::from_raw(RawCompany {
            name: card.name,
            listing_url: card.link.unwrap_or_default(),
            website_url: detail.website_url,
            domain: card.domain,
            location: card.location,
            offer_text: card.offer_text,
            job_titles: detail.job_titles,
            unsolicited_hint: None,
            attributes: detail.attributes,
        })
    }

    /// Write to both sinks, each falling back to its local path on failure.
    ///
    /// Failures are logged with the destination path and never abort the run.
    pub async fn persist(&self, companies: &[Company], report: &mut DiscoveryReport) {
        if companies.is_empty() {
            warn!("No companies found during the scraping process");
            return;
        }

        let config = &self.ctx.config;

        if let Some((path, entries)) = with_fallback(
            "JSON",
            &config.json_file,
            &config.fallback_json_file,
            |path| save_json(path, companies),
        )
        .await
        {
            info!(path = %path.display(), entries, "Companies saved to JSON");
            report.json_entries = Some(entries);
            report.json_path = Some(path);
        }

        if let Some((path, inserted)) = with_fallback(
            "SQLite",
            &config.db_file,
            &config.fallback_db_file,
            |path| save_sqlite(path, companies),
        )
        .await
        {
            info!(path = %path.display(), inserted, "Companies saved to SQLite");
            report.rows_inserted = Some(inserted);
            report.db_path = Some(path);
        }
    }
}

async fn save_json(path: PathBuf, companies: &[Company]) -> anyhow::Result<usize> {
    JsonStore::new(path).merge(companies).await
}

async fn save_sqlite(path: PathBuf, companies: &[Company]) -> anyhow::Result<u64> {
    Database::open(&path).await?.save_companies(companies).await
}

/// Run `save` against `primary`, then against `fallback` if that fails.
///
/// # Returns
/// * `Option<(PathBuf, T)>` - The path that was written and the sink's result
async fn with_fallback<T, F, Fut>(
    sink: &str,
    primary: &Path,
    fallback: &Path,
    save: F,
) -> Option<(PathBuf, T)>
where
    F: Fn(PathBuf) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    let e = match save(primary.to_path_buf()).await {
        Ok(value) => return Some((primary.to_path_buf(), value)),
        Err(e) => e,
    };

    if primary == fallback {
        error!(sink, path = %primary.display(), "Error saving companies: {:#}", e);
        return None;
    }

    error!(
        sink,
        path = %primary.display(),
        fallback = %fallback.display(),
        "Error saving companies, retrying at fallback path: {:#}",
        e
    );

    match save(fallback.to_path_buf()).await {
        Ok(value) => Some((fallback.to_path_buf(), value)),
        Err(e) => {
            error!(
                sink,
                path = %primary.display(),
                fallback = %fallback.display(),
                "Error saving companies to fallback path: {:#}",
                e
            );
            None
        }
    }
}
