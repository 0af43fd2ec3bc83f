//! Browser automation seam
//!
//! The migration logic only talks to [`BrowserSession`]. The Chromium
//! implementation knows the site's markup; the mock implementation replays a
//! scripted site for tests.

pub mod chromium;
pub mod mock;
mod selectors;

use async_trait::async_trait;

use crate::config::Credentials;
use crate::data::{RelationshipId, VisibilityTier};
use crate::error::Result;

pub use chromium::{ChromiumLauncher, ChromiumSession};
pub use mock::{MockCall, MockLauncher, MockPlatform};

/// One logged-in (or about to be) browser page
#[async_trait]
pub trait BrowserSession: Send {
    /// Log in. Fails with `AuthenticationFailure` if the post-login state never appears.
    async fn login(&mut self, credentials: &Credentials) -> Result<()>;

    /// Show the first page of the account's following list for `tier`
    async fn show_following(&mut self, tier: VisibilityTier) -> Result<()>;

    /// Wait until the listing items are present. Fails with `Timeout`.
    async fn wait_for_listing(&mut self) -> Result<()>;

    /// Raw `href` of every relationship link on the current listing page
    async fn listing_links(&mut self) -> Result<Vec<Option<String>>>;

    /// Activate the next-page control if it is present and visible.
    /// Returns whether a next page was opened.
    async fn next_page(&mut self) -> Result<bool>;

    /// Navigate to an account's page and wait for it to load
    async fn open_profile(&mut self, id: &RelationshipId) -> Result<()>;

    /// Whether the "Follow" control is visible on the current profile
    async fn follow_control_visible(&mut self) -> Result<bool>;

    /// Activate the "Follow" control
    async fn click_follow(&mut self) -> Result<()>;

    /// Open the options affordance next to the "Follow" control
    async fn open_follow_options(&mut self) -> Result<()>;

    /// Pick "Follow privately" from the open options
    async fn select_follow_privately(&mut self) -> Result<()>;

    /// Shut the session down
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Creates independent browser sessions, one per migration phase
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}
