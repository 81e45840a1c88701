use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::{
    browser::{Browser, BrowserConfig},
    cdp::browser_protocol::network::SetUserAgentOverrideParams,
    element::Element,
    error::CdpError,
    page::{Page, ScreenshotParams},
};
use futures::StreamExt;
use log::{debug, info};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{BrowserSession, config::BrowserOptions, error::SessionError};

// True when the element's centre point is not covered by something else.
const HIT_TEST_JS: &str = "function() {
    const r = this.getBoundingClientRect();
    const hit = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2);
    return hit === null || hit === this || this.contains(hit);
}";

const IS_ENABLED_JS: &str = "function() {
    return !this.disabled
        && this.getAttribute('aria-disabled') !== 'true'
        && !(this.parentElement
            && this.parentElement.classList.contains('ais-Pagination-item--disabled'));
}";

// DevTools answers these once a node handle outlives the DOM it came from.
const DETACHED_NODE_ERRORS: [&str; 4] = [
    "No node with given id",
    "Could not find node with given id",
    "Node with given id does not belong to the document",
    "Cannot find context with specified id",
];

impl From<CdpError> for SessionError {
    fn from(err: CdpError) -> Self {
        classify_protocol_error(err.to_string())
    }
}

fn classify_protocol_error(message: String) -> SessionError {
    if DETACHED_NODE_ERRORS.iter().any(|known| message.contains(known)) {
        SessionError::StaleElement
    } else {
        SessionError::Protocol(message)
    }
}

/// A Chrome tab driven over the DevTools protocol.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: Option<JoinHandle<()>>,
}

impl ChromeSession {
    pub async fn launch(options: &BrowserOptions) -> Result<Self, SessionError> {
        if options.headless {
            info!("Running in headless mode");
        } else {
            info!("Running in visible mode");
        }

        let (width, height) = options.window_size;
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(width, height)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(SessionError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {e}");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        page.set_user_agent(SetUserAgentOverrideParams::new(options.user_agent.clone()))
            .await?;

        Ok(Self {
            browser,
            page,
            handler: Some(handler),
        })
    }
}

fn remote_value(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn reload(&self) -> Result<(), SessionError> {
        self.page.reload().await?;
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<Option<Element>, SessionError> {
        Ok(self.find_elements(selector).await?.into_iter().next())
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<Element>, SessionError> {
        Ok(self.page.find_elements(selector).await?)
    }

    async fn current_page_content(&self) -> Result<String, SessionError> {
        Ok(self.page.content().await?)
    }

    async fn execute_script(
        &self,
        script: &str,
        target: Option<&Element>,
    ) -> Result<Value, SessionError> {
        match target {
            Some(element) => {
                let returned = element.call_js_fn(script, false).await?;
                Ok(remote_value(returned.result.value))
            }
            None => {
                let evaluated = self.page.evaluate(script).await?;
                Ok(evaluated.value().cloned().unwrap_or(Value::Null))
            }
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<(), SessionError> {
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), SessionError> {
        let Some(handler) = self.handler.take() else {
            return Ok(());
        };
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process did not exit cleanly: {e}");
        }
        handler.abort();
        closed?;
        Ok(())
    }

    async fn inner_html(&self, element: &Element) -> Result<String, SessionError> {
        Ok(element.inner_html().await?.unwrap_or_default())
    }

    async fn text(&self, element: &Element) -> Result<String, SessionError> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool, SessionError> {
        let returned = element.call_js_fn(IS_ENABLED_JS, false).await?;
        Ok(returned.result.value.and_then(|v| v.as_bool()).unwrap_or(true))
    }

    async fn click(&self, element: &Element) -> Result<(), SessionError> {
        let returned = element.call_js_fn(HIT_TEST_JS, false).await?;
        let unobstructed = returned.result.value.and_then(|v| v.as_bool()).unwrap_or(true);
        if !unobstructed {
            return Err(SessionError::ClickIntercepted);
        }
        element.click().await?;
        Ok(())
    }
}
