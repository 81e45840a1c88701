use std::{future::pending, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};

use quicket_scraper::{
    ChromeSession, ScrapeError, Scraper, ScrapingContext, cli::Cli, config::ScrapingConfig,
    diagnostics::Diagnostics, export, logging,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match ScrapingConfig::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(cli.verbose, &config.log_file);

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error during scraping: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {e}");
        pending::<()>().await;
    }
}

async fn run(cli: &Cli, config: &ScrapingConfig) -> anyhow::Result<()> {
    info!("Starting Quicket scraper with the following settings:");
    info!("Max pages: {}", cli.pages);
    info!("Output file: {}", cli.output.display());
    info!("Headless mode: {}", cli.headless);

    let diagnostics = Diagnostics::new(&config.diagnostics_dir);
    diagnostics.prepare()?;
    let context = ScrapingContext::new(cli.scrape_options(config), diagnostics)?;

    info!("Setting up Chrome session...");
    let session = ChromeSession::launch(&cli.browser_options(config))
        .await
        .context("failed to start browser session")?;

    match Scraper::new(session, context).scrape_until(shutdown_signal()).await {
        Ok(report) => {
            export::write_csv(&cli.output, &report.records)?;
            info!(
                "Scraping completed successfully. {} events saved to {} \
                 ({} pages, stopped at page {}: {:?})",
                report.records.len(),
                cli.output.display(),
                report.pages_visited,
                report.last_page,
                report.stop_reason
            );
            Ok(())
        }
        Err(failure) => {
            if let Err(e) = export::write_csv(&cli.output, &failure.partial) {
                error!("Error saving data to CSV: {e:#}");
            } else {
                info!("Saved {} events collected before the failure", failure.partial.len());
            }
            if matches!(failure.error, ScrapeError::Interrupted) {
                warn!("Run was interrupted on page {}", failure.page);
            }
            Err(failure.into())
        }
    }
}
