//! Application flow: sign in once, then submit an unsolicited application
//! to every matching company not yet in the applied ledger

pub mod cover_letter;

use chrono::Local;
use tracing::{error, info, warn};
use url::Url;

use crate::config::CandidateFilter;
use crate::context::RunContext;
use crate::error::ScrapeError;
use crate::ledger::AppliedLedger;
use crate::models::Company;
use crate::selectors::SelectorKey;

/// Aggregate counts reported at the end of an application run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationReport {
    pub candidates: usize,
    pub submitted: usize,
    pub already_applied: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    AlreadyApplied,
    Submitted,
    Failed,
}

impl CandidateFilter {
    pub fn matches(&self, company: &Company) -> bool {
        let contains = |field: &Option<String>, needle: &str| {
            needle.is_empty() || field.as_deref().is_some_and(|value| value.contains(needle))
        };

        contains(&company.location, &self.location_contains)
            && contains(&company.domain, &self.domain_contains)
            && (!self.require_unsolicited || company.accepts_unsolicited_applications())
    }
}

pub fn select_candidates<'c>(companies: &'c [Company], filter: &CandidateFilter) -> Vec<&'c Company> {
    companies.iter().filter(|company| filter.matches(company)).collect()
}

/// Jobs page an application starts from: detail path without query, + `/jobs`.
pub fn application_url(listing_url: &str) -> Option<String> {
    let mut url = Url::parse(listing_url).ok()?;
    url.set_query(None);
    url.set_fragment(None);
    let path = format!("{}/jobs", url.path().trim_end_matches('/'));
    url.set_path(&path);
    Some(url.to_string())
}

pub struct Applicant<'a> {
    ctx: &'a RunContext,
    ledger: AppliedLedger,
}

impl<'a> Applicant<'a> {
    pub fn new(ctx: &'a RunContext, ledger: AppliedLedger) -> Self {
        Self { ctx, ledger }
    }

    pub fn ledger(&self) -> &AppliedLedger {
        &self.ledger
    }

    /// Apply to every company matching the configured filter.
    ///
    /// Signing in is the only step whose failure is returned; each candidate
    /// succeeds or fails on its own.
    pub async fn run(&mut self, companies: &[Company]) -> Result<ApplicationReport, ScrapeError> {
        let candidates = select_candidates(companies, &self.ctx.config.candidates);
        let mut report = ApplicationReport {
            candidates: candidates.len(),
            ..ApplicationReport::default()
        };

        if candidates.is_empty() {
            info!(loaded = companies.len(), "No companies found to apply to");
            return Ok(report);
        }

        self.login().await?;

        for company in candidates {
            match self.apply_to(company).await {
                ApplyOutcome::AlreadyApplied => report.already_applied += 1,
                ApplyOutcome::Submitted => report.submitted += 1,
                ApplyOutcome::Failed => report.failed += 1,
            }
        }

        info!(
            candidates = report.candidates,
            submitted = report.submitted,
            already_applied = report.already_applied,
            failed = report.failed,
            "Application run finished"
        );
        Ok(report)
    }

    /// Fill and submit the sign-in form.
    pub async fn login(&self) -> Result<(), ScrapeError> {
        let ctx = self.ctx;
        let credentials = ctx
            .config
            .credentials
            .as_ref()
            .ok_or(ScrapeError::MissingCredential("APPLY_EMAIL / APPLY_PASSWORD"))?;

        let sign_in = ctx.config.sign_in_url.as_str();
        ctx.browser
            .navigate(sign_in)
            .await
            .map_err(|e| ScrapeError::FetcherUnavailable(e.to_string()))?;

        self.fill(SelectorKey::LoginEmail, &credentials.email).await?;
        self.fill(SelectorKey::LoginPassword, &credentials.password)
            .await?;
        ctx.click_key(SelectorKey::LoginSubmit).await?;

        info!(url = sign_in, "Signed in");
        Ok(())
    }

    /// Submit one application unless the ledger already lists the company.
    pub async fn apply_to(&mut self, company: &Company) -> ApplyOutcome {
        if self.ledger.contains(&company.name) {
            info!(company = %company.name, "Already applied, skipping");
            return ApplyOutcome::AlreadyApplied;
        }

        info!(company = %company.name, "Applying");
        if let Err(e) = self.submit(company).await {
            warn!(company = %company.name, "Application aborted: {}", e);
            return ApplyOutcome::Failed;
        }

        info!(company = %company.name, "Application successfully submitted");
        if let Err(e) = self.ledger.append(&company.name).await {
            error!(
                company = %company.name,
                path = %self.ledger.path().display(),
                "Submitted but not recorded in the applied ledger: {:#}",
                e
            );
        }
        ApplyOutcome::Submitted
    }

    async fn submit(&self, company: &Company) -> Result<(), ScrapeError> {
        let ctx = self.ctx;
        let jobs_page = application_url(&company.listing_url)
            .ok_or_else(|| ScrapeError::InvalidLink(company.listing_url.clone()))?;

        ctx.browser.navigate(&jobs_page).await?;
        ctx.click_key(SelectorKey::ApplyButton).await?;

        let letter = cover_letter::render(
            &ctx.config.cover_letter,
            &company.name,
            Local::now().date_naive(),
        );
        self.fill(SelectorKey::CoverLetter, &letter).await?;
        info!(company = %company.name, "Cover letter written");

        ctx.click_key(SelectorKey::SubmitApplication).await?;
        ctx.click_key(SelectorKey::ConfirmApplication).await?;
        Ok(())
    }

    async fn fill(&self, key: SelectorKey, text: &str) -> Result<(), ScrapeError> {
        let query = self.ctx.selectors.query(key);
        self.ctx.require(key, query).await?;
        self.ctx.browser.fill(query, text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OPEN_APPLICATION, RawCompany};

    fn company(name: &str, location: &str, domain: &str, open: bool) -> Company {
        let job_titles = if open {
            vec![OPEN_APPLICATION.to_string()]
        } else {
            vec!["Sales".to_string()]
        };
        Company::from_raw(RawCompany {
            name: name.to_string(),
            listing_url: format!("https://example.test/fr/companies/{name}?o=1"),
            location: Some(location.to_string()),
            domain: Some(domain.to_string()),
            job_titles,
            ..RawCompany::default()
        })
        .unwrap()
    }

    #[test]
    fn default_filter_needs_location_domain_and_open_application() {
        let companies = vec![
            company("a", "Paris 9e", "Logiciels, SaaS", true),
            company("b", "Lyon", "Logiciels", true),
            company("c", "Paris", "Banque", true),
            company("d", "Paris", "Logiciels", false),
        ];

        let selected = select_candidates(&companies, &CandidateFilter::default());
        let names: Vec<_> = selected.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn filter_is_overridable() {
        let companies = vec![company("b", "Lyon", "Logiciels", false)];
        let filter = CandidateFilter {
            location_contains: "Lyon".to_string(),
            domain_contains: String::new(),
            require_unsolicited: false,
        };
        assert_eq!(select_candidates(&companies, &filter).len(), 1);
    }

    #[test]
    fn unknown_location_never_matches() {
        let mut unknown = company("e", "Paris", "Logiciels", true);
        unknown.location = None;
        assert!(!CandidateFilter::default().matches(&unknown));
    }

    #[test]
    fn empty_needle_matches_unknown_fields() {
        let mut unknown = company("f", "Paris", "Logiciels", true);
        unknown.location = None;
        unknown.domain = None;

        let filter = CandidateFilter {
            location_contains: String::new(),
            domain_contains: String::new(),
            require_unsolicited: true,
        };
        assert!(filter.matches(&unknown));
    }

    #[test]
    fn application_url_drops_query() {
        assert_eq!(
            application_url("https://example.test/fr/companies/acme?o=1").as_deref(),
            Some("https://example.test/fr/companies/acme/jobs")
        );
        assert_eq!(application_url(""), None);
    }
}
