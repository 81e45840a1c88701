mod chrome;
mod error;
mod event_extractor;
mod navigator;
mod ratelimit;
mod scraper;
mod scraping_context;
mod session;
mod text_manipulators;

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod export;
pub mod logging;
pub mod wait;

pub use chrome::ChromeSession;
pub use error::{
    ExtractError, ItemError, ScrapeError, ScrapeFailure, SessionError, UrlInvalidError,
};
pub use event_extractor::{
    EVENT_ITEM_SELECTOR, EVENT_LIST_SELECTOR, EventExtractor, EventRecord, NOT_SPECIFIED,
};
pub use navigator::{
    COOKIE_ACCEPT_SELECTOR, NEXT_PAGE_LABEL, NavigationState, NavigationTimings, Navigator,
    PAGINATION_LINK_SELECTOR,
};
pub use ratelimit::PolitenessDelay;
pub use self::scraper::{ScrapeReport, Scraper, StopReason};
pub use scraping_context::ScrapingContext;
pub use session::{BrowserSession, SCRIPT_CLICK_JS, SCROLL_INTO_VIEW_JS};
pub use text_manipulators::DateTimeParser;
