//! Scripted browser for deterministic testing
//!
//! [`MockPlatform`] plays the remote site: per-tier listing pages for the
//! source account and the follow state of the target account. Sessions
//! launched from it share that state, so a follow made in one run is seen
//! by the next, and every interaction is recorded for assertions.
//!
//! # Example
//! ```no_run
//! use follow_migrator::browser::MockPlatform;
//! use follow_migrator::data::VisibilityTier;
//!
//! let platform = MockPlatform::new()
//!     .with_pages(VisibilityTier::Public, &[&["/en/users/1", "/en/users/2"]])
//!     .already_following(&["2"]);
//! let launcher = platform.launcher();
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BrowserSession, SessionLauncher};
use crate::config::Credentials;
use crate::data::{RelationshipId, VisibilityTier};
use crate::error::{MigrationError, Result};

/// Interaction recorded by a mock session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Launch,
    Login(String),
    ShowFollowing(VisibilityTier),
    WaitForListing,
    NextPage,
    OpenProfile(RelationshipId),
    ClickFollow(RelationshipId),
    OpenFollowOptions(RelationshipId),
    SelectFollowPrivately(RelationshipId),
    Close,
}

#[derive(Default)]
struct PlatformState {
    pages: HashMap<VisibilityTier, Vec<Vec<Option<String>>>>,
    following: HashMap<RelationshipId, VisibilityTier>,
    unavailable: HashSet<RelationshipId>,
    rejected_logins: HashSet<String>,
    listing_never_ready: bool,
    fail_on_profile: Option<RelationshipId>,
    calls: Vec<MockCall>,
}

/// Shared fake of the remote site
#[derive(Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing pages for `tier`, one slice of links per page
    pub fn with_pages(self, tier: VisibilityTier, pages: &[&[&str]]) -> Self {
        let pages = pages
            .iter()
            .map(|page| page.iter().map(|link| Some(link.to_string())).collect())
            .collect();
        self.with_raw_pages(tier, pages)
    }

    /// Listing pages that may contain links without an `href`
    pub fn with_raw_pages(self, tier: VisibilityTier, pages: Vec<Vec<Option<String>>>) -> Self {
        self.state.lock().pages.insert(tier, pages);
        self
    }

    /// Accounts the target account already follows (no follow control shown)
    pub fn already_following(self, ids: &[&str]) -> Self {
        {
            let mut state = self.state.lock();
            for id in ids {
                state
                    .following
                    .insert(RelationshipId::from(*id), VisibilityTier::Public);
            }
        }
        self
    }

    /// Deleted or suspended accounts (no follow control shown)
    pub fn unavailable(self, ids: &[&str]) -> Self {
        self.state
            .lock()
            .unavailable
            .extend(ids.iter().map(|id| RelationshipId::from(*id)));
        self
    }

    pub fn rejecting_login(self, username: &str) -> Self {
        self.state.lock().rejected_logins.insert(username.to_string());
        self
    }

    /// The listing never renders, so every wait for it times out
    pub fn with_listing_timeout(self) -> Self {
        self.state.lock().listing_never_ready = true;
        self
    }

    /// Fail navigation to `id` once, simulating a crash mid-tier
    pub fn failing_on_profile(&self, id: &str) {
        self.state.lock().fail_on_profile = Some(RelationshipId::from(id));
    }

    pub fn launcher(&self) -> MockLauncher {
        MockLauncher {
            platform: self.clone(),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Profiles navigated to, in order
    pub fn profile_visits(&self) -> Vec<RelationshipId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::OpenProfile(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    /// How the target account follows `id`, if at all
    pub fn follow_state(&self, id: &str) -> Option<VisibilityTier> {
        self.state
            .lock()
            .following
            .get(&RelationshipId::from(id))
            .copied()
    }

    fn record(&self, call: MockCall) {
        self.state.lock().calls.push(call);
    }
}

/// Launches [`MockSession`]s against a shared [`MockPlatform`]
#[derive(Clone)]
pub struct MockLauncher {
    platform: MockPlatform,
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        self.platform.record(MockCall::Launch);
        Ok(Box::new(MockSession {
            platform: self.platform.clone(),
            tier: VisibilityTier::Public,
            page: 0,
            profile: None,
            options_open: false,
        }))
    }
}

pub struct MockSession {
    platform: MockPlatform,
    tier: VisibilityTier,
    page: usize,
    profile: Option<RelationshipId>,
    options_open: bool,
}

impl MockSession {
    fn current_profile(&self) -> Result<RelationshipId> {
        self.profile
            .clone()
            .ok_or_else(|| MigrationError::Browser("No profile page open".to_string()))
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        self.platform
            .record(MockCall::Login(credentials.username.clone()));
        if self
            .platform
            .state
            .lock()
            .rejected_logins
            .contains(&credentials.username)
        {
            return Err(MigrationError::AuthenticationFailure {
                username: credentials.username.clone(),
            });
        }
        Ok(())
    }

    async fn show_following(&mut self, tier: VisibilityTier) -> Result<()> {
        self.platform.record(MockCall::ShowFollowing(tier));
        self.tier = tier;
        self.page = 0;
        Ok(())
    }

    async fn wait_for_listing(&mut self) -> Result<()> {
        self.platform.record(MockCall::WaitForListing);
        if self.platform.state.lock().listing_never_ready {
            return Err(MigrationError::timeout(
                "following list",
                std::time::Duration::from_secs(30),
            ));
        }
        Ok(())
    }

    async fn listing_links(&mut self) -> Result<Vec<Option<String>>> {
        let state = self.platform.state.lock();
        Ok(state
            .pages
            .get(&self.tier)
            .and_then(|pages| pages.get(self.page))
            .cloned()
            .unwrap_or_default())
    }

    async fn next_page(&mut self) -> Result<bool> {
        self.platform.record(MockCall::NextPage);
        let page_count = self
            .platform
            .state
            .lock()
            .pages
            .get(&self.tier)
            .map_or(0, Vec::len);
        if self.page + 1 < page_count {
            self.page += 1;
            return Ok(true);
        }
        Ok(false)
    }

    async fn open_profile(&mut self, id: &RelationshipId) -> Result<()> {
        self.platform.record(MockCall::OpenProfile(id.clone()));
        self.options_open = false;
        {
            let mut state = self.platform.state.lock();
            if state.fail_on_profile.as_ref() == Some(id) {
                state.fail_on_profile = None;
                return Err(MigrationError::Browser(format!(
                    "Navigation to user {} failed",
                    id
                )));
            }
        }
        self.profile = Some(id.clone());
        Ok(())
    }

    async fn follow_control_visible(&mut self) -> Result<bool> {
        let id = self.current_profile()?;
        let state = self.platform.state.lock();
        Ok(!state.following.contains_key(&id) && !state.unavailable.contains(&id))
    }

    async fn click_follow(&mut self) -> Result<()> {
        let id = self.current_profile()?;
        self.platform.record(MockCall::ClickFollow(id.clone()));
        self.platform
            .state
            .lock()
            .following
            .insert(id, VisibilityTier::Public);
        Ok(())
    }

    async fn open_follow_options(&mut self) -> Result<()> {
        let id = self.current_profile()?;
        self.platform.record(MockCall::OpenFollowOptions(id));
        self.options_open = true;
        Ok(())
    }

    async fn select_follow_privately(&mut self) -> Result<()> {
        let id = self.current_profile()?;
        if !self.options_open {
            return Err(MigrationError::timeout(
                "\"Follow privately\"",
                std::time::Duration::from_secs(30),
            ));
        }
        self.platform
            .record(MockCall::SelectFollowPrivately(id.clone()));
        self.platform
            .state
            .lock()
            .following
            .insert(id, VisibilityTier::Private);
        self.options_open = false;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.platform.record(MockCall::Close);
        Ok(())
    }
}
