use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SessionError;

/// The capability surface the scraper needs from a live browser.
///
/// Selectors are CSS. Lookups that find nothing are `Ok(None)` / `Ok(vec![])`,
/// not errors; errors are reserved for a broken session.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Reloads the current document in place.
    async fn reload(&self) -> Result<(), SessionError>;

    async fn find_element(&self, selector: &str) -> Result<Option<Self::Element>, SessionError>;

    async fn find_elements(&self, selector: &str) -> Result<Vec<Self::Element>, SessionError>;

    /// Serialized markup of the whole rendered document.
    async fn current_page_content(&self) -> Result<String, SessionError>;

    /// Runs a JavaScript function declaration. When `target` is given it is
    /// bound to `this`.
    async fn execute_script(
        &self,
        script: &str,
        target: Option<&Self::Element>,
    ) -> Result<Value, SessionError>;

    async fn screenshot(&self, path: &Path) -> Result<(), SessionError>;

    async fn quit(&mut self) -> Result<(), SessionError>;

    async fn inner_html(&self, element: &Self::Element) -> Result<String, SessionError>;

    async fn text(&self, element: &Self::Element) -> Result<String, SessionError>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, SessionError>;

    /// A real pointer click. Reports [`SessionError::ClickIntercepted`] when
    /// another element covers the target.
    async fn click(&self, element: &Self::Element) -> Result<(), SessionError>;
}

pub const SCROLL_INTO_VIEW_JS: &str = "function() { this.scrollIntoView(true); }";
pub const SCRIPT_CLICK_JS: &str = "function() { this.click(); }";
