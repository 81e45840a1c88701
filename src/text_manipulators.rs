use regex::Regex;
use scraper::ElementRef;

/// Long-form calendar date, e.g. "Friday, March 14, 2025".
const DATE_PATTERN: &str = r"[A-Za-z]+,\s+[A-Za-z]+\s+\d{1,2},\s+\d{4}";
/// "9:05", "18:30", "7:00 PM".
const TIME_PATTERN: &str = r"\d{1,2}:\d{2}(?:\s*[AP]M)?";

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>().trim().to_string()
}

/// Splits the combined date/time line shown on an event card.
pub struct DateTimeParser {
    date_regex: Regex,
    time_regex: Regex,
}

impl DateTimeParser {
    pub fn new() -> anyhow::Result<Self> {
        let date_regex = Regex::new(DATE_PATTERN)?;
        let time_regex = Regex::new(TIME_PATTERN)?;
        Ok(Self {
            date_regex,
            time_regex,
        })
    }

    /// Returns `(date, time)`. Either half is empty when its pattern is absent.
    pub fn parse(&self, raw: &str) -> (String, String) {
        let date = self
            .date_regex
            .find(raw)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        let time = self
            .time_regex
            .find(raw)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        (date, time)
    }
}
