//! A scripted in-memory listing site that stands in for a real browser.
#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;

use quicket_scraper::{
    BrowserSession, COOKIE_ACCEPT_SELECTOR, EVENT_ITEM_SELECTOR, NEXT_PAGE_LABEL,
    NavigationTimings, PAGINATION_LINK_SELECTOR, PolitenessDelay, SCRIPT_CLICK_JS,
    SCROLL_INTO_VIEW_JS, ScrapingContext, SessionError, config::ScrapeOptions,
    diagnostics::Diagnostics,
};

pub const WHEN: &str = "Friday, March 14, 2025 · 18:30";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeElement {
    EventItem { page: usize, index: usize },
    PageLink(u32),
    Next,
    CookieButton,
}

#[derive(Debug, Default)]
pub struct SiteState {
    /// Event titles per page.
    pub pages: Vec<Vec<String>>,
    /// Zero-based page currently rendered, once loaded.
    pub shown: Option<usize>,
    pub missing_links: HashSet<u32>,
    /// Links that exist but do nothing when clicked.
    pub dead_links: HashSet<u32>,
    pub cookie_banner: bool,
    pub intercept_clicks: bool,
    /// Remaining `current_page_content` failures per zero-based page.
    pub content_failures: HashMap<usize, u32>,
    pub visited_urls: Vec<String>,
    pub clicks: Vec<FakeElement>,
    pub script_clicks: u32,
    pub cookie_clicks: u32,
    pub content_calls: u32,
    pub reloads: u32,
    pub quits: u32,
    pub screenshots: Vec<PathBuf>,
}

impl SiteState {
    fn render_item(&self, page: usize, index: usize) -> String {
        let title = &self.pages[page][index];
        format!(
            concat!(
                r#"<div class="l-event-content">"#,
                r#"<div class="l-hit-name">{title}</div>"#,
                r#"<div class="l-hit-venue">Venue of {title}</div>"#,
                r#"<div class="l-date-container">{when}</div>"#,
                "</div>",
            ),
            title = title,
            when = WHEN,
        )
    }

    fn render(&self) -> String {
        let Some(page) = self.shown else {
            return "<html><body></body></html>".to_string();
        };
        let items: String = (0..self.pages[page].len())
            .map(|i| format!(r#"<li class="l-event-item">{}</li>"#, self.render_item(page, i)))
            .collect();
        let nav: String = self
            .links()
            .iter()
            .map(|link| format!(r#"<a class="ais-Pagination-link">{}</a>"#, self.label(link)))
            .collect();
        format!(
            concat!(
                r#"<html><body><div class="l-event-list"><ul>{items}</ul></div>"#,
                "<nav>{nav}</nav></body></html>",
            ),
            items = items,
            nav = nav,
        )
    }

    fn links(&self) -> Vec<FakeElement> {
        let mut links: Vec<_> = (1..=self.pages.len() as u32)
            .filter(|n| !self.missing_links.contains(n))
            .map(FakeElement::PageLink)
            .collect();
        links.push(FakeElement::Next);
        links
    }

    fn label(&self, element: &FakeElement) -> String {
        match element {
            FakeElement::PageLink(n) => n.to_string(),
            FakeElement::Next => NEXT_PAGE_LABEL.to_string(),
            FakeElement::CookieButton => "Accept".to_string(),
            FakeElement::EventItem { page, index } => self.pages[*page][*index].clone(),
        }
    }

    fn activate(&mut self, element: &FakeElement) {
        self.clicks.push(element.clone());
        let Some(shown) = self.shown else { return };
        match element {
            FakeElement::PageLink(n) if !self.dead_links.contains(n) => {
                self.shown = Some(*n as usize - 1);
            }
            FakeElement::Next if shown + 1 < self.pages.len() => self.shown = Some(shown + 1),
            FakeElement::CookieButton => {
                self.cookie_banner = false;
                self.cookie_clicks += 1;
            }
            _ => {}
        }
    }
}

#[derive(Clone)]
pub struct FakeSite {
    state: Arc<Mutex<SiteState>>,
}

impl FakeSite {
    pub fn with_pages(pages: &[&[&str]]) -> Self {
        let state = SiteState {
            pages: pages
                .iter()
                .map(|titles| titles.iter().map(|t| t.to_string()).collect())
                .collect(),
            ..SiteState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, SiteState> {
        self.state.lock().unwrap()
    }

    /// Pretends the listing root was already opened.
    pub fn loaded(self) -> Self {
        self.state().shown = Some(0);
        self
    }
}

#[async_trait]
impl BrowserSession for FakeSite {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let mut state = self.state();
        state.visited_urls.push(url.to_string());
        state.shown = Some(0);
        Ok(())
    }

    async fn reload(&self) -> Result<(), SessionError> {
        self.state().reloads += 1;
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<Option<FakeElement>, SessionError> {
        Ok(self.find_elements(selector).await?.into_iter().next())
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<FakeElement>, SessionError> {
        let state = self.state();
        let Some(shown) = state.shown else {
            return Ok(vec![]);
        };
        let found = match selector {
            EVENT_ITEM_SELECTOR => (0..state.pages[shown].len())
                .map(|index| FakeElement::EventItem { page: shown, index })
                .collect(),
            PAGINATION_LINK_SELECTOR => state.links(),
            COOKIE_ACCEPT_SELECTOR if state.cookie_banner => vec![FakeElement::CookieButton],
            _ => vec![],
        };
        Ok(found)
    }

    async fn current_page_content(&self) -> Result<String, SessionError> {
        let mut state = self.state();
        state.content_calls += 1;
        if let Some(shown) = state.shown {
            if let Some(remaining) = state.content_failures.get_mut(&shown) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(SessionError::Protocol("renderer busy".to_string()));
                }
            }
        }
        Ok(state.render())
    }

    async fn execute_script(
        &self,
        script: &str,
        target: Option<&FakeElement>,
    ) -> Result<Value, SessionError> {
        let mut state = self.state();
        match (script, target) {
            (SCROLL_INTO_VIEW_JS, Some(_)) => Ok(Value::Null),
            (SCRIPT_CLICK_JS, Some(element)) => {
                state.script_clicks += 1;
                state.activate(element);
                Ok(Value::Null)
            }
            _ => Err(SessionError::Protocol(format!("unexpected script: {script}"))),
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<(), SessionError> {
        self.state().screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), SessionError> {
        self.state().quits += 1;
        Ok(())
    }

    async fn inner_html(&self, element: &FakeElement) -> Result<String, SessionError> {
        let state = self.state();
        match element {
            FakeElement::EventItem { page, index } if state.shown == Some(*page) => {
                Ok(state.render_item(*page, *index))
            }
            FakeElement::EventItem { .. } => Err(SessionError::StaleElement),
            other => Ok(state.label(other)),
        }
    }

    async fn text(&self, element: &FakeElement) -> Result<String, SessionError> {
        Ok(self.state().label(element))
    }

    async fn is_enabled(&self, element: &FakeElement) -> Result<bool, SessionError> {
        let state = self.state();
        Ok(match element {
            FakeElement::Next => state.shown.is_some_and(|shown| shown + 1 < state.pages.len()),
            _ => true,
        })
    }

    async fn click(&self, element: &FakeElement) -> Result<(), SessionError> {
        let mut state = self.state();
        let is_link = matches!(element, FakeElement::PageLink(_) | FakeElement::Next);
        if state.intercept_clicks && is_link {
            return Err(SessionError::ClickIntercepted);
        }
        state.activate(element);
        Ok(())
    }
}

pub fn fast_timings() -> NavigationTimings {
    NavigationTimings {
        cookie_wait: Duration::from_secs(5),
        cookie_settle: Duration::from_secs(1),
        click_settle: Duration::from_millis(500),
        page_load_timeout: Duration::from_secs(10),
        poll_interval: Duration::from_millis(100),
    }
}

pub fn options(max_pages: u32) -> ScrapeOptions {
    ScrapeOptions {
        base_url: "https://listing.test/events/".to_string(),
        max_pages,
        politeness: PolitenessDelay::none(),
        navigation: fast_timings(),
        ..ScrapeOptions::default()
    }
}

pub fn context(max_pages: u32) -> ScrapingContext {
    ScrapingContext::new(options(max_pages), Diagnostics::new("diagnostics")).unwrap()
}

pub fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}
