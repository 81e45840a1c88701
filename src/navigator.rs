use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::sleep;

use crate::{
    BrowserSession,
    diagnostics::Diagnostics,
    error::SessionError,
    event_extractor::EVENT_ITEM_SELECTOR,
    session::{SCRIPT_CLICK_JS, SCROLL_INTO_VIEW_JS},
    wait::{DEFAULT_POLL_INTERVAL, poll_until},
};

pub const PAGINATION_LINK_SELECTOR: &str = "a.ais-Pagination-link";
pub const NEXT_PAGE_LABEL: &str = "›";
pub const COOKIE_ACCEPT_SELECTOR: &str = "button.cookie-consent-accept";
const COOKIE_ACCEPT_LABELS: [&str; 2] = ["Accept", "I agree"];

/// Bounded waits used while moving between pages.
#[derive(Debug, Clone)]
pub struct NavigationTimings {
    pub cookie_wait: Duration,
    pub cookie_settle: Duration,
    pub click_settle: Duration,
    pub page_load_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for NavigationTimings {
    fn default() -> Self {
        Self {
            cookie_wait: Duration::from_secs(5),
            cookie_settle: Duration::from_secs(1),
            click_settle: Duration::from_millis(500),
            page_load_timeout: Duration::from_secs(10),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current_page: u32,
    pub max_pages: u32,
    /// Inner markup of the first event item when the current page was
    /// captured. A different value later means the listing was re-rendered.
    pub reference_marker: Option<String>,
}

/// Moves one browser session through the paginated listing.
///
/// Every operation reports success as a `bool`; failures are logged here and
/// the caller decides what to fall back to.
pub struct Navigator<S: BrowserSession> {
    session: S,
    state: NavigationState,
    timings: NavigationTimings,
    diagnostics: Diagnostics,
}

impl<S: BrowserSession> Navigator<S> {
    pub fn new(
        session: S,
        max_pages: u32,
        timings: NavigationTimings,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            session,
            state: NavigationState {
                current_page: 1,
                max_pages: max_pages.max(1),
                reference_marker: None,
            },
            timings,
            diagnostics,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// Accepts the cookie banner if one shows up. Never fails the scrape.
    pub async fn dismiss_cookie_consent(&self) {
        let session = &self.session;
        let timings = &self.timings;
        let button = poll_until(timings.cookie_wait, timings.poll_interval, || async move {
            match find_consent_button(session).await {
                Ok(button) => button,
                Err(e) => {
                    debug!("Cookie consent lookup failed: {e}");
                    None
                }
            }
        })
        .await;

        let Some(button) = button else {
            info!("No cookie consent dialog found or it has already been accepted");
            return;
        };

        info!("Cookie consent dialog found, accepting cookies");
        match self.session.click(&button).await {
            Ok(()) => sleep(self.timings.cookie_settle).await,
            Err(e) => warn!("Error handling cookie consent: {e}"),
        }
    }

    /// Blocks until at least one event item is rendered, up to `timeout`.
    pub async fn wait_for_event_items(&self, timeout: Duration) -> bool {
        let session = &self.session;
        poll_until(timeout, self.timings.poll_interval, || async move {
            match session.find_element(EVENT_ITEM_SELECTOR).await {
                Ok(item) => item.map(|_| ()),
                Err(e) => {
                    debug!("Event item lookup failed: {e}");
                    None
                }
            }
        })
        .await
        .is_some()
    }

    /// Remembers what the current page's first event looks like, so the
    /// navigation about to start can tell when the listing has changed.
    /// `false` when there is no rendered event to compare against.
    pub async fn capture_reference_marker(&mut self) -> bool {
        let page = self.state.current_page;
        self.state.reference_marker = None;
        if !self.wait_for_event_items(self.timings.page_load_timeout).await {
            warn!("No event items on page {page} to compare against");
            return false;
        }
        match first_item_marker(&self.session).await {
            Ok(Some(marker)) => {
                self.state.reference_marker = Some(marker);
                true
            }
            Ok(None) => {
                warn!("First event on page {page} disappeared before it could be captured");
                false
            }
            Err(e) => {
                warn!("Could not capture reference marker on page {page}: {e}");
                false
            }
        }
    }

    /// Jumps straight to `target` via its page-number link.
    pub async fn navigate_to_page(&mut self, target: u32) -> bool {
        let current = self.state.current_page;
        if target == current {
            return true;
        }
        if target < current {
            warn!("Refusing to move backwards from page {current} to page {target}");
            return false;
        }

        let link = match self.find_pagination_link(&target.to_string()).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                warn!("Page {target} link not found");
                return false;
            }
            Err(e) => {
                error!("Error navigating to page {target}: {e}");
                return false;
            }
        };

        if !self.capture_reference_marker().await {
            return false;
        }
        if !self.safe_click(&link).await || !self.wait_for_page_load().await {
            return false;
        }

        self.state.current_page = target;
        debug!("Now on page {target}");
        true
    }

    /// Advances one page with the "next" control.
    pub async fn navigate_to_next(&mut self) -> bool {
        let next = match self.find_pagination_link(NEXT_PAGE_LABEL).await {
            Ok(Some(next)) => next,
            Ok(None) => {
                info!("No more pages available");
                return false;
            }
            Err(e) => {
                error!("Error navigating to next page: {e}");
                self.capture(&format!("error_next_page_{}", self.state.current_page)).await;
                return false;
            }
        };

        match self.session.is_enabled(&next).await {
            Ok(true) => {}
            Ok(false) => {
                info!("Next page button is disabled");
                return false;
            }
            Err(e) => {
                error!("Error navigating to next page: {e}");
                self.capture(&format!("error_next_page_{}", self.state.current_page)).await;
                return false;
            }
        }

        if !self.capture_reference_marker().await {
            return false;
        }
        if !self.safe_click(&next).await || !self.wait_for_page_load().await {
            return false;
        }

        self.state.current_page += 1;
        debug!("Now on page {}", self.state.current_page);
        true
    }

    /// Scrolls `element` into view and clicks it, falling back to a script
    /// click when something overlays it.
    pub async fn safe_click(&self, element: &S::Element) -> bool {
        if let Err(e) = self.session.execute_script(SCROLL_INTO_VIEW_JS, Some(element)).await {
            error!("Error clicking element: {e}");
            return false;
        }
        sleep(self.timings.click_settle).await;

        match self.session.click(element).await {
            Ok(()) => true,
            Err(SessionError::ClickIntercepted) => {
                info!("Click intercepted, trying JavaScript click");
                match self.session.execute_script(SCRIPT_CLICK_JS, Some(element)).await {
                    Ok(_) => true,
                    Err(e) => {
                        error!("Error clicking element: {e}");
                        false
                    }
                }
            }
            Err(e) => {
                error!("Error clicking element: {e}");
                false
            }
        }
    }

    /// Waits until the first event item no longer matches the reference
    /// marker, or has disappeared altogether. Without a marker nothing can be
    /// confirmed, so that is a failure.
    pub async fn wait_for_page_load(&self) -> bool {
        let Some(marker) = self.state.reference_marker.as_deref() else {
            warn!("No reference marker for page {}", self.state.current_page);
            return false;
        };

        let session = &self.session;
        let timings = &self.timings;
        let changed = poll_until(timings.page_load_timeout, timings.poll_interval, || async move {
            match first_item_marker(session).await {
                Ok(Some(current)) => (current != marker).then_some(()),
                Ok(None) | Err(SessionError::StaleElement) => Some(()),
                Err(e) => {
                    debug!("Page change check failed: {e}");
                    None
                }
            }
        })
        .await;

        if changed.is_none() {
            warn!("Timed out waiting for page to load");
            self.capture(&format!("timeout_page_{}", self.state.current_page)).await;
            return false;
        }
        true
    }

    pub async fn capture(&self, label: &str) {
        self.diagnostics.capture(&self.session, label).await;
    }

    async fn find_pagination_link(&self, label: &str) -> Result<Option<S::Element>, SessionError> {
        for link in self.session.find_elements(PAGINATION_LINK_SELECTOR).await? {
            if self.session.text(&link).await?.trim() == label {
                return Ok(Some(link));
            }
        }
        Ok(None)
    }
}

async fn first_item_marker<S: BrowserSession>(session: &S) -> Result<Option<String>, SessionError> {
    let Some(item) = session.find_element(EVENT_ITEM_SELECTOR).await? else {
        return Ok(None);
    };
    session.inner_html(&item).await.map(Some)
}

async fn find_consent_button<S: BrowserSession>(
    session: &S,
) -> Result<Option<S::Element>, SessionError> {
    if let Some(button) = session.find_element(COOKIE_ACCEPT_SELECTOR).await? {
        return Ok(Some(button));
    }
    for button in session.find_elements("button").await? {
        let label = session.text(&button).await?;
        if COOKIE_ACCEPT_LABELS.iter().any(|accept| label.contains(accept)) {
            return Ok(Some(button));
        }
    }
    Ok(None)
}
