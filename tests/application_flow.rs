mod common;

use common::*;
use company_scraper::application::{Applicant, ApplyOutcome};
use company_scraper::error::ScrapeError;
use company_scraper::ledger::AppliedLedger;
use company_scraper::models::{Company, OPEN_APPLICATION, RawCompany};
use company_scraper::selectors::SelectorKey;

const COVER_LETTER: &str = "textarea[name='cover_letter']";

fn sign_in_page() -> String {
    page(
        "<form><input data-testid=\"login-field-email\" type=\"email\">\
         <input data-testid=\"login-field-password\" type=\"password\">\
         <button data-testid=\"login-button-submit\">Se connecter</button></form>",
    )
}

fn application_page(with_confirm: bool) -> String {
    let confirm = if with_confirm {
        "<button data-testid=\"apply-form-confirm\">Confirmer</button>"
    } else {
        ""
    };
    page(&format!(
        "<a data-testid=\"company_jobs-button-spontaneous-application\" href=\"#\">Postuler</a>\
         <form><textarea name=\"cover_letter\"></textarea>\
         <button data-testid=\"apply-form-submit\">Envoyer</button>{confirm}</form>"
    ))
}

fn company(name: &str) -> Company {
    Company::from_raw(RawCompany {
        name: name.to_string(),
        listing_url: url(&format!("/fr/companies/{}?q=1", name.to_lowercase())),
        domain: Some("Logiciels".to_string()),
        location: Some("Paris".to_string()),
        job_titles: vec![OPEN_APPLICATION.to_string()],
        ..RawCompany::default()
    })
    .unwrap()
}

#[tokio::test]
async fn ledgered_company_is_skipped_without_navigation() {
    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("applied.txt");
    tokio::fs::write(&ledger_path, "Acme\n").await.unwrap();

    let browser = FakeBrowser::default()
        .with_page(&url("/fr/signin"), sign_in_page())
        .with_page(&url("/fr/companies/acme/jobs"), application_page(true))
        .with_page(&url("/fr/companies/beta/jobs"), application_page(true));
    let fetcher = FakeFetcher::default();
    let ctx = context(&browser, &fetcher, config(dir.path()));

    let ledger = AppliedLedger::load(&ledger_path).await;
    let mut applicant = Applicant::new(&ctx, ledger);
    let report = applicant
        .run(&[company("Acme"), company("Beta")])
        .await
        .unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(report.already_applied, 1);
    assert_eq!(report.submitted, 1);
    assert_eq!(report.failed, 0);

    assert!(!browser.navigations().contains(&url("/fr/companies/acme/jobs")));
    assert!(browser.navigations().contains(&url("/fr/companies/beta/jobs")));
    assert_eq!(
        tokio::fs::read_to_string(&ledger_path).await.unwrap(),
        "Acme\nBeta\n"
    );

    let letters: Vec<_> = browser
        .fills()
        .into_iter()
        .filter(|(selector, _)| selector == COVER_LETTER)
        .collect();
    assert_eq!(letters.len(), 1);
    assert!(letters[0].1.contains("Beta"));
}

#[tokio::test]
async fn second_run_submits_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("applied.txt");
    let browser = FakeBrowser::default()
        .with_page(&url("/fr/signin"), sign_in_page())
        .with_page(&url("/fr/companies/beta/jobs"), application_page(true));
    let fetcher = FakeFetcher::default();
    let ctx = context(&browser, &fetcher, config(dir.path()));

    let mut first = Applicant::new(&ctx, AppliedLedger::load(&ledger_path).await);
    assert_eq!(first.run(&[company("Beta")]).await.unwrap().submitted, 1);

    let mut second = Applicant::new(&ctx, AppliedLedger::load(&ledger_path).await);
    let report = second.run(&[company("Beta")]).await.unwrap();
    assert_eq!(report.submitted, 0);
    assert_eq!(report.already_applied, 1);
    assert_eq!(tokio::fs::read_to_string(&ledger_path).await.unwrap(), "Beta\n");
}

#[tokio::test]
async fn failed_step_leaves_candidate_unledgered() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::default()
        .with_page(&url("/fr/signin"), sign_in_page())
        .with_page(&url("/fr/companies/beta/jobs"), application_page(false));
    let fetcher = FakeFetcher::default();
    let ctx = context(&browser, &fetcher, config(dir.path()));

    let mut applicant = Applicant::new(&ctx, AppliedLedger::load(dir.path().join("applied.txt")).await);

    assert_eq!(applicant.apply_to(&company("Beta")).await, ApplyOutcome::Failed);
    // Missing jobs page: navigation fails, next candidate still gets its turn
    assert_eq!(applicant.apply_to(&company("Gamma")).await, ApplyOutcome::Failed);
    assert!(applicant.ledger().is_empty());
    assert!(!dir.path().join("applied.txt").exists());
}

#[tokio::test]
async fn missing_login_form_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::default()
        .with_page(&url("/fr/signin"), page("<p>Service indisponible</p>"))
        .with_page(&url("/fr/companies/beta/jobs"), application_page(true));
    let fetcher = FakeFetcher::default();
    let ctx = context(&browser, &fetcher, config(dir.path()));

    let mut applicant = Applicant::new(&ctx, AppliedLedger::load(dir.path().join("applied.txt")).await);
    let err = applicant.run(&[company("Beta")]).await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::MissingElement { key: SelectorKey::LoginEmail, .. }
    ));
    assert!(!browser.navigations().contains(&url("/fr/companies/beta/jobs")));
}

#[tokio::test]
async fn missing_credentials_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.credentials = None;
    let browser = FakeBrowser::default().with_page(&url("/fr/signin"), sign_in_page());
    let fetcher = FakeFetcher::default();
    let ctx = context(&browser, &fetcher, config);

    let mut applicant = Applicant::new(&ctx, AppliedLedger::load(dir.path().join("applied.txt")).await);
    let err = applicant.run(&[company("Beta")]).await.unwrap_err();

    assert!(matches!(err, ScrapeError::MissingCredential(_)));
    assert!(browser.navigations().is_empty());
}

#[tokio::test]
async fn no_candidates_skips_sign_in() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::default();
    let fetcher = FakeFetcher::default();
    let ctx = context(&browser, &fetcher, config(dir.path()));

    let mut lyon = company("Lyonnaise");
    lyon.location = Some("Lyon".to_string());

    let mut applicant = Applicant::new(&ctx, AppliedLedger::load(dir.path().join("applied.txt")).await);
    let report = applicant.run(&[lyon]).await.unwrap();

    assert_eq!(report.candidates, 0);
    assert!(browser.navigations().is_empty());
}
