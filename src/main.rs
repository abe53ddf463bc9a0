use anyhow::Result;
use tracing::{Instrument, error, info, info_span};

use company_scraper::config::Config;
use company_scraper::context::RunContext;
use company_scraper::discovery::CompanyFinder;
use company_scraper::telemetry;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init(&config.log_file, &config.log_level);

    info!("Starting the company scraping process");

    let ctx = RunContext::launch(config).inspect_err(|e| {
        error!("Failed to initialize the web driver: {}", e);
    })?;

    let result = CompanyFinder::new(&ctx)
        .run()
        .instrument(info_span!("discovery"))
        .await;

    // Release the browser before reporting, whatever the outcome
    ctx.close().await;

    let report = result.inspect_err(|e| error!("Discovery aborted: {}", e))?;

    println!(
        "Pages processed: {}/{}  Companies found: {}  Cards skipped: {}",
        report.pages_processed, report.pages_total, report.companies, report.cards_skipped
    );
    if let (Some(entries), Some(path)) = (report.json_entries, &report.json_path) {
        println!("JSON document entries: {entries} ({})", path.display());
    }
    if let (Some(rows), Some(path)) = (report.rows_inserted, &report.db_path) {
        println!("New database rows: {rows} ({})", path.display());
    }

    info!("Company scraping process completed");
    Ok(())
}
