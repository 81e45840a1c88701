use std::future::{Future, pending};

use log::{debug, error, info, warn};
use tokio::time::sleep;

use crate::{
    BrowserSession, EventRecord,
    config::ScrapeOptions,
    diagnostics::{PAGE_DUMP_CHARS, truncate_chars},
    error::{ExtractError, ScrapeError, ScrapeFailure},
    event_extractor::EventExtractor,
    navigator::Navigator,
    scraping_context::ScrapingContext,
};

#[derive(Debug)]
enum Phase {
    Init,
    LoadingFirstPage,
    Extracting,
    Advancing,
    Done(StopReason),
    Failed(ScrapeError),
}

/// Why the page loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Reached the configured page limit.
    PageLimit,
    /// Neither the page-number link nor the next control moved us on.
    NoMorePages,
}

#[derive(Debug)]
pub struct ScrapeReport {
    pub records: Vec<EventRecord>,
    pub last_page: u32,
    pub pages_visited: u32,
    pub stop_reason: StopReason,
}

/// Walks the paginated listing with one browser session and collects events.
pub struct Scraper<S: BrowserSession> {
    navigator: Navigator<S>,
    extractor: EventExtractor,
    options: ScrapeOptions,
    records: Vec<EventRecord>,
    pages_visited: u32,
}

impl<S: BrowserSession> Scraper<S> {
    pub fn new(session: S, context: ScrapingContext) -> Self {
        let ScrapingContext {
            options,
            extractor,
            diagnostics,
        } = context;
        let navigator = Navigator::new(
            session,
            options.max_pages,
            options.navigation.clone(),
            diagnostics,
        );
        Self {
            navigator,
            extractor,
            options,
            records: Vec::new(),
            pages_visited: 0,
        }
    }

    pub async fn scrape(self) -> Result<ScrapeReport, ScrapeFailure> {
        self.scrape_until(pending()).await
    }

    /// Runs the scrape until it finishes or `shutdown` resolves. The browser
    /// session is closed on every path out of here.
    pub async fn scrape_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<ScrapeReport, ScrapeFailure> {
        let outcome = tokio::select! {
            outcome = self.run() => outcome,
            () = shutdown => {
                info!("Scraping interrupted by user");
                Err(ScrapeError::Interrupted)
            }
        };

        self.teardown().await;

        let last_page = self.navigator.current_page();
        match outcome {
            Ok(stop_reason) => {
                info!("Scraped a total of {} events", self.records.len());
                Ok(ScrapeReport {
                    records: self.records,
                    last_page,
                    pages_visited: self.pages_visited,
                    stop_reason,
                })
            }
            Err(error) => Err(ScrapeFailure {
                error,
                page: last_page,
                partial: self.records,
            }),
        }
    }

    async fn run(&mut self) -> Result<StopReason, ScrapeError> {
        let mut phase = Phase::Init;
        loop {
            debug!("Scrape phase: {phase:?}");
            phase = match phase {
                Phase::Init => {
                    info!("Navigating to {}", self.options.base_url);
                    match self.navigator.session().navigate(&self.options.base_url).await {
                        Ok(()) => Phase::LoadingFirstPage,
                        Err(e) => Phase::Failed(e.into()),
                    }
                }
                Phase::LoadingFirstPage => {
                    self.navigator.dismiss_cookie_consent().await;
                    let timeout = self.options.initial_load_timeout;
                    if self.navigator.wait_for_event_items(timeout).await {
                        Phase::Extracting
                    } else {
                        Phase::Failed(ScrapeError::NoInitialContent(timeout))
                    }
                }
                Phase::Extracting => {
                    info!(
                        "Scraping page {} of {}",
                        self.navigator.current_page(),
                        self.options.max_pages
                    );
                    let events = self.extract_with_retry().await;
                    self.records.extend(events);
                    self.pages_visited += 1;
                    self.options.politeness.wait().await;
                    Phase::Advancing
                }
                Phase::Advancing => match self.advance().await {
                    None => Phase::Extracting,
                    Some(reason) => Phase::Done(reason),
                },
                Phase::Done(reason) => return Ok(reason),
                Phase::Failed(error) => {
                    self.record_failure(&error).await;
                    return Err(error);
                }
            };
        }
    }

    /// Moves to the next page. `Some` means the loop is over.
    async fn advance(&mut self) -> Option<StopReason> {
        let current = self.navigator.current_page();
        if current >= self.navigator.state().max_pages {
            return Some(StopReason::PageLimit);
        }

        let next = current + 1;
        if self.navigator.navigate_to_page(next).await {
            return None;
        }
        warn!("Failed to navigate to page {next}, trying next button");
        if self.navigator.navigate_to_next().await {
            return None;
        }
        info!("Could not navigate to next page, ending scrape");
        Some(StopReason::NoMorePages)
    }

    /// Extracts the current page, reloading between failed attempts. Gives up
    /// with an empty page rather than failing the run.
    async fn extract_with_retry(&mut self) -> Vec<EventRecord> {
        let attempts = self.options.extraction_attempts.max(1);
        let page = self.navigator.current_page();

        for attempt in 1..=attempts {
            let err = match self.extract_page().await {
                Ok(events) => return events,
                Err(err) => err,
            };
            warn!("Error extracting events (attempt {attempt}/{attempts}): {err}");
            if attempt == attempts {
                break;
            }

            info!("Reloading page {page} and retrying...");
            if let Err(e) = self.navigator.session().reload().await {
                warn!("Reload of page {page} failed: {e}");
            }
            self.navigator.navigate_to_page(page).await;
            sleep(self.options.retry_settle).await;
        }

        error!("Failed to extract events after {attempts} attempts");
        Vec::new()
    }

    async fn extract_page(&self) -> Result<Vec<EventRecord>, ExtractError> {
        let snapshot = self.navigator.session().current_page_content().await?;
        self.extractor.extract(&snapshot, self.navigator.current_page())
    }

    async fn record_failure(&self, error: &ScrapeError) {
        error!("Error during scraping: {error}");
        self.navigator.capture("error_screenshot").await;
        match self.navigator.session().current_page_content().await {
            Ok(content) => error!(
                "Page source at error: {}...",
                truncate_chars(&content, PAGE_DUMP_CHARS)
            ),
            Err(e) => warn!("Could not read page source after failure: {e}"),
        }
    }

    async fn teardown(&mut self) {
        info!("Closing browser session...");
        if let Err(e) = self.navigator.session_mut().quit().await {
            warn!("Error closing browser session: {e}");
        }
    }
}
