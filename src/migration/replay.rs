//! Follow replay on the target account

use std::time::Duration;

use crate::browser::BrowserSession;
use crate::data::{RelationshipId, VisibilityTier};
use crate::error::Result;

/// Outcome of replaying one tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierReport {
    pub tier: VisibilityTier,
    /// Profiles visited
    pub attempted: usize,
    /// Follows actually issued
    pub followed: usize,
    /// Profiles without a follow control (already followed or unavailable)
    pub skipped: usize,
    /// Whole tier skipped because the backup marked it done
    pub skipped_tier: bool,
}

impl TierReport {
    fn new(tier: VisibilityTier) -> Self {
        Self {
            tier,
            attempted: 0,
            followed: 0,
            skipped: 0,
            skipped_tier: false,
        }
    }

    /// Report for a tier the backup already marks as replayed
    pub fn already_done(tier: VisibilityTier) -> Self {
        Self {
            skipped_tier: true,
            ..Self::new(tier)
        }
    }
}

/// Issue the tier-specific follow on the profile currently open
async fn follow(session: &mut dyn BrowserSession, tier: VisibilityTier) -> Result<()> {
    match tier {
        VisibilityTier::Public => session.click_follow().await,
        // The plain control only creates a public follow.
        VisibilityTier::Private => {
            session.open_follow_options().await?;
            session.select_follow_privately().await
        }
    }
}

/// Replays follows one account at a time with a fixed pause after each follow
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    cooldown: Duration,
}

impl ReplayEngine {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Follow every id of `tier` that is not followed yet.
    ///
    /// A missing follow control is not an error, which makes re-running a tier
    /// after an interruption harmless.
    pub async fn replay(
        &self,
        session: &mut dyn BrowserSession,
        tier: VisibilityTier,
        ids: &[RelationshipId],
        already_done: bool,
    ) -> Result<TierReport> {
        if already_done {
            tracing::info!(tier = %tier, "Tier already replayed, skipping");
            return Ok(TierReport::already_done(tier));
        }

        let mut report = TierReport::new(tier);
        tracing::info!(tier = %tier, total = ids.len(), "Replaying follows");
        for (index, id) in ids.iter().enumerate() {
            session.open_profile(id).await?;
            report.attempted += 1;

            if !session.follow_control_visible().await? {
                tracing::debug!(tier = %tier, id = %id, "No follow control, skipping");
                report.skipped += 1;
                continue;
            }

            follow(session, tier).await?;
            report.followed += 1;
            tracing::debug!(
                tier = %tier,
                id = %id,
                progress = index + 1,
                total = ids.len(),
                "Followed"
            );

            if !self.cooldown.is_zero() {
                tokio::time::sleep(self.cooldown).await;
            }
        }

        tracing::info!(
            tier = %tier,
            followed = report.followed,
            skipped = report.skipped,
            "Tier replayed"
        );
        Ok(report)
    }
}
