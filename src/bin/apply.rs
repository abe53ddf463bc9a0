use anyhow::Result;
use tracing::{Instrument, error, info, info_span};

use company_scraper::application::Applicant;
use company_scraper::config::Config;
use company_scraper::context::RunContext;
use company_scraper::database::JsonStore;
use company_scraper::ledger::AppliedLedger;
use company_scraper::telemetry;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init(&config.log_file, &config.log_level);

    let companies = JsonStore::new(&config.json_file).load_companies().await;
    info!(
        loaded = companies.len(),
        path = %config.json_file.display(),
        "Companies loaded"
    );

    let ledger = AppliedLedger::load(&config.applied_file).await;
    info!(entries = ledger.len(), "Applied ledger loaded");

    let ctx = RunContext::launch(config).inspect_err(|e| {
        error!("Failed to initialize the web driver: {}", e);
    })?;

    let result = Applicant::new(&ctx, ledger)
        .run(&companies)
        .instrument(info_span!("application"))
        .await;

    ctx.close().await;

    let report = result.inspect_err(|e| error!("Application run aborted: {}", e))?;

    println!(
        "Candidates: {}  Submitted: {}  Already applied: {}  Failed: {}",
        report.candidates, report.submitted, report.already_applied, report.failed
    );
    Ok(())
}
