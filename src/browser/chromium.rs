//! Chromium session driven over CDP

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::selectors::*;
use super::{BrowserSession, SessionLauncher};
use crate::config::{BrowserConfig, Credentials};
use crate::data::{RelationshipId, VisibilityTier};
use crate::error::{MigrationError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shared script helpers: `visible(el)` and `byText(text)`.
/// `byText` returns the innermost visible element whose trimmed text is `text`.
const SCRIPT_PRELUDE: &str = r#"
const visible = (el) => !!el
    && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length)
    && getComputedStyle(el).visibility !== 'hidden';
const byText = (text, tag) => {
    const matches = Array.from(document.querySelectorAll(tag || '*'))
        .filter((el) => (el.textContent || '').trim() === text && visible(el));
    return matches.find((el) => !matches.some((other) => other !== el && el.contains(other)));
};
"#;

impl From<CdpError> for MigrationError {
    fn from(err: CdpError) -> Self {
        MigrationError::Browser(err.to_string())
    }
}

fn js_str(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

fn script(body: String) -> String {
    format!("(() => {{ {} {} }})()", SCRIPT_PRELUDE, body)
}

/// Script body that turns true once the page has left `before`
fn url_changed(before: &str) -> String {
    format!("return location.href !== {};", js_str(before))
}

/// Launches a fresh Chromium process per session
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: BrowserConfig,
}

impl ChromiumLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let session = ChromiumSession::launch(&self.config).await?;
        Ok(Box::new(session))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    driver: PageDriver,
    handler: JoinHandle<()>,
    base_url: String,
}

impl ChromiumSession {
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut builder = CdpConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(MigrationError::Browser)?;

        tracing::debug!(headless = config.headless, "Launching Chromium");
        let (browser, mut handler) = Browser::launch(cdp_config).await?;

        // The CDP connection only makes progress while the handler is polled.
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser.new_page("about:blank").await?;
        page.set_user_agent(SetUserAgentOverrideParams::new(USER_AGENT))
            .await?;
        page.execute(SetExtraHttpHeadersParams::new(Headers::new(
            serde_json::json!({ "Accept-Language": ACCEPT_LANGUAGE }),
        )))
        .await?;

        Ok(Self {
            browser,
            driver: PageDriver {
                page,
                wait_timeout: config.wait_timeout,
            },
            handler,
            base_url: config.base_url.clone(),
        })
    }
}

/// Element waits and scripted interactions on one page
struct PageDriver {
    page: Page,
    wait_timeout: Duration,
}

impl PageDriver {
    async fn eval<T: DeserializeOwned>(&self, body: String) -> Result<T> {
        self.page
            .evaluate(script(body))
            .await?
            .into_value()
            .map_err(|e| MigrationError::Browser(format!("Unexpected script result: {}", e)))
    }

    /// Poll `body` (a script returning a boolean) until it yields true
    async fn poll_until(&self, body: String, what: &str) -> Result<()> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            if self.eval::<bool>(body.clone()).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(MigrationError::timeout(what, self.wait_timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_selector(&self, selector: &str, what: &str) -> Result<()> {
        self.poll_until(
            format!("return visible(document.querySelector({}));", js_str(selector)),
            what,
        )
        .await
    }

    async fn click_selector(&self, selector: &str, what: &str) -> Result<()> {
        self.wait_for_selector(selector, what).await?;
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }

    async fn click_text(&self, text: &str) -> Result<()> {
        self.poll_until(
            format!(
                "const el = byText({}); if (!el) return false; el.click(); return true;",
                js_str(text)
            ),
            &format!("\"{}\"", text),
        )
        .await
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.wait_for_selector(selector, selector).await?;
        self.page
            .find_element(selector)
            .await?
            .click()
            .await?
            .type_str(value)
            .await?;
        Ok(())
    }

    /// Run `then` with `btn` bound to the visible "Follow" button, if any
    async fn with_follow_button<T: DeserializeOwned>(&self, then: &str) -> Result<T> {
        self.eval(format!(
            "const btn = Array.from(document.querySelectorAll('button'))
                .find((b) => (b.textContent || '').trim() === {} && visible(b));
             {}",
            js_str(FOLLOW_TEXT),
            then
        ))
        .await
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    /// Wait until the location moves away from `before`. Client-side
    /// navigation leaves the old DOM in place until then.
    async fn wait_for_navigation(&self, before: &str, what: &str) -> Result<String> {
        self.poll_until(url_changed(before), what).await?;
        self.current_url().await
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        tracing::info!(username = %credentials.username, "Logging in");
        self.driver.page.goto(home_url(&self.base_url)).await?;

        let driver = &self.driver;
        driver.click_text(LOGIN_TEXT).await?;
        driver.fill(USERNAME_INPUT, &credentials.username).await?;
        driver.fill(PASSWORD_INPUT, &credentials.password).await?;
        driver.click_selector(SUBMIT_BUTTON, "login submit button").await?;

        match driver.wait_for_selector(AVATAR_BUTTON, "post-login avatar").await {
            Err(MigrationError::Timeout { .. }) => Err(MigrationError::AuthenticationFailure {
                username: credentials.username.clone(),
            }),
            other => other,
        }
    }

    async fn show_following(&mut self, tier: VisibilityTier) -> Result<()> {
        let before = self.driver.current_url().await?;
        match tier {
            VisibilityTier::Public => {
                self.driver.click_selector(AVATAR_BUTTON, "avatar menu").await?;
                self.driver.click_selector(FOLLOWING_LINK, "following link").await?;
            }
            VisibilityTier::Private => self.driver.click_text(PRIVATE_TAB_TEXT).await?,
        }
        // Until the location changes the previous view's links are still
        // on the page and would be read into this tier.
        let url = self
            .driver
            .wait_for_navigation(&before, &format!("{} following list", tier))
            .await?;
        tracing::debug!(tier = %tier, url = %url, "Showing following list");
        Ok(())
    }

    async fn wait_for_listing(&mut self) -> Result<()> {
        self.driver.wait_for_selector(LISTING_LINK, "following list").await
    }

    async fn listing_links(&mut self) -> Result<Vec<Option<String>>> {
        self.driver
            .eval(format!(
                "return Array.from(document.querySelectorAll({})).map((a) => a.getAttribute('href'));",
                js_str(LISTING_LINK)
            ))
            .await
    }

    async fn next_page(&mut self) -> Result<bool> {
        let before = self.driver.current_url().await?;
        let clicked: bool = self
            .driver
            .eval(format!(
                "const icon = document.querySelector({});
                 if (!icon || !visible(icon) || !icon.parentElement) return false;
                 icon.parentElement.click();
                 return true;",
                js_str(NEXT_PAGE_ICON)
            ))
            .await?;
        if !clicked {
            return Ok(false);
        }

        self.driver
            .wait_for_navigation(&before, "next listing page")
            .await?;
        Ok(true)
    }

    async fn open_profile(&mut self, id: &RelationshipId) -> Result<()> {
        self.driver
            .page
            .goto(profile_url(&self.base_url, id.as_str()))
            .await?;
        Ok(())
    }

    async fn follow_control_visible(&mut self) -> Result<bool> {
        self.driver.with_follow_button("return !!btn;").await
    }

    async fn click_follow(&mut self) -> Result<()> {
        let clicked: bool = self
            .driver
            .with_follow_button("if (!btn) return false; btn.click(); return true;")
            .await?;
        if !clicked {
            return Err(MigrationError::Browser(
                "Follow control disappeared before it could be clicked".to_string(),
            ));
        }
        Ok(())
    }

    async fn open_follow_options(&mut self) -> Result<()> {
        let opened: bool = self
            .driver
            .with_follow_button(
                "const opt = btn && btn.parentElement && btn.parentElement.lastElementChild;
                 if (!opt) return false; opt.click(); return true;",
            )
            .await?;
        if !opened {
            return Err(MigrationError::Browser(
                "Follow options control not found".to_string(),
            ));
        }
        Ok(())
    }

    async fn select_follow_privately(&mut self) -> Result<()> {
        self.driver.click_text(FOLLOW_PRIVATELY_TEXT).await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        let closed = this.browser.close().await;
        let _ = this.browser.wait().await;
        this.handler.abort();
        closed?;
        Ok(())
    }
}
