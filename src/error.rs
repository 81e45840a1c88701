use std::time::Duration;

use thiserror::Error;

use crate::EventRecord;

/// Failures reported by a [`crate::BrowserSession`] implementation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    /// Another element sits on top of the click target.
    #[error("click intercepted by an overlapping element")]
    ClickIntercepted,
    #[error("element is no longer attached to the document")]
    StaleElement,
    #[error("browser protocol error: {0}")]
    Protocol(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single extraction attempt produced nothing usable.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not capture page snapshot: {0}")]
    Snapshot(#[from] SessionError),
    #[error("event listing container is missing from the snapshot")]
    ListingMissing,
}

/// Per-item problems. These only ever skip the offending item.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("event item has no content block")]
    MissingContent,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no event listings appeared within {0:?}")]
    NoInitialContent(Duration),
    #[error("browser session failed: {0}")]
    Session(#[from] SessionError),
    #[error("scrape interrupted")]
    Interrupted,
}

/// A fatal run failure together with whatever was collected before it.
#[derive(Debug, Error)]
#[error("scrape failed on page {page}: {error}")]
pub struct ScrapeFailure {
    #[source]
    pub error: ScrapeError,
    pub page: u32,
    pub partial: Vec<EventRecord>,
}

#[derive(Debug, Error)]
#[error("The supplied URL is not valid: {0}")]
pub struct UrlInvalidError(pub String);
