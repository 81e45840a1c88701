use crate::{config::ScrapeOptions, diagnostics::Diagnostics, event_extractor::EventExtractor};

/// Everything a scrape run needs besides the browser session.
pub struct ScrapingContext {
    pub options: ScrapeOptions,
    pub extractor: EventExtractor,
    pub diagnostics: Diagnostics,
}

impl ScrapingContext {
    pub fn new(options: ScrapeOptions, diagnostics: Diagnostics) -> anyhow::Result<Self> {
        let extractor = EventExtractor::new()?;
        Ok(ScrapingContext {
            options,
            extractor,
            diagnostics,
        })
    }
}
