use std::path::PathBuf;

use clap::Parser;

use crate::config::{BrowserOptions, ScrapeOptions, ScrapingConfig};

/// Scrape events from the Quicket listing into a CSV file.
#[derive(Debug, Parser)]
#[command(name = "quicket_scraper", version, about = "Scrape events from Quicket website.")]
pub struct Cli {
    /// Maximum number of pages to scrape.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
    /// Output CSV file name.
    #[arg(long, default_value = "quicket_events.csv")]
    pub output: PathBuf,
    /// Enable verbose logging.
    #[arg(long)]
    pub verbose: bool,
    /// Run browser in headless mode.
    #[arg(long)]
    pub headless: bool,
}

impl Cli {
    pub fn scrape_options(&self, config: &ScrapingConfig) -> ScrapeOptions {
        ScrapeOptions {
            base_url: config.base_url.clone(),
            max_pages: self.pages,
            ..ScrapeOptions::default()
        }
    }

    pub fn browser_options(&self, config: &ScrapingConfig) -> BrowserOptions {
        BrowserOptions {
            headless: self.headless,
            user_agent: config.user_agent.clone(),
            ..BrowserOptions::default()
        }
    }
}
