use anyhow::anyhow;
use log::{debug, info, warn};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::{
    error::{ExtractError, ItemError},
    text_manipulators::{DateTimeParser, extract_text},
};

/// Placeholder for a title or venue the listing didn't show.
pub const NOT_SPECIFIED: &str = "Not specified";

pub const EVENT_LIST_SELECTOR: &str = "div.l-event-list";
pub const EVENT_ITEM_SELECTOR: &str = "div.l-event-list li.l-event-item";
const EVENT_CONTENT_SELECTOR: &str = "div.l-event-content";
const TITLE_SELECTOR: &str = "div.l-hit-name";
const VENUE_SELECTOR: &str = "div.l-hit-venue";
const DATE_TIME_SELECTOR: &str = "div.l-date-container";

/// One listing entry. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub title: String,
    pub location: String,
    pub date: String,
    pub time: String,
}

impl EventRecord {
    pub fn new(
        title: Option<String>,
        location: Option<String>,
        date: String,
        time: String,
    ) -> Self {
        Self {
            title: title.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            location: location.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            date,
            time,
        }
    }
}

/// Turns a serialized page into event records.
pub struct EventExtractor {
    list_selector: Selector,
    item_selector: Selector,
    content_selector: Selector,
    title_selector: Selector,
    venue_selector: Selector,
    date_time_selector: Selector,
    parser: DateTimeParser,
}

fn parse_selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector `{css}`: {e}"))
}

impl EventExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            list_selector: parse_selector(EVENT_LIST_SELECTOR)?,
            item_selector: parse_selector(EVENT_ITEM_SELECTOR)?,
            content_selector: parse_selector(EVENT_CONTENT_SELECTOR)?,
            title_selector: parse_selector(TITLE_SELECTOR)?,
            venue_selector: parse_selector(VENUE_SELECTOR)?,
            date_time_selector: parse_selector(DATE_TIME_SELECTOR)?,
            parser: DateTimeParser::new()?,
        })
    }

    /// Extracts every well-formed event item in document order.
    ///
    /// A malformed item is logged and skipped; it never fails the whole
    /// snapshot. The only error is a snapshot with no event listing at all,
    /// which means the page was not rendered when it was captured.
    pub fn extract(&self, snapshot: &str, page: u32) -> Result<Vec<EventRecord>, ExtractError> {
        let document = Html::parse_document(snapshot);
        if document.select(&self.list_selector).next().is_none() {
            return Err(ExtractError::ListingMissing);
        }

        let items: Vec<_> = document.select(&self.item_selector).collect();
        info!("Found {} events on page {}", items.len(), page);

        let mut events = Vec::with_capacity(items.len());
        for item in items {
            match self.extract_item(item) {
                Ok(event) => {
                    debug!("Extracted event: {:?}", event);
                    events.push(event);
                }
                Err(e) => warn!("Error extracting event data: {e}"),
            }
        }
        Ok(events)
    }

    fn extract_item(&self, item: ElementRef) -> Result<EventRecord, ItemError> {
        let content = item
            .select(&self.content_selector)
            .next()
            .ok_or(ItemError::MissingContent)?;

        let field = |selector: &Selector| content.select(selector).next().map(extract_text);
        let title = field(&self.title_selector);
        let location = field(&self.venue_selector);
        let date_time = field(&self.date_time_selector).unwrap_or_default();

        let (date, time) = self.parser.parse(&date_time);
        Ok(EventRecord::new(title, location, date, time))
    }
}
