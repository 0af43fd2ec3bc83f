//! Migration state machine
//!
//! `Fresh -> Extracting -> Extracted -> Replaying -> Done`, or
//! `Resuming -> Replaying -> Done` when a backup exists at start.

use std::fmt;
use std::time::Duration;

use crate::browser::{BrowserSession, SessionLauncher};
use crate::config::Credentials;
use crate::data::{BackupRecord, BackupStore, VisibilityTier};
use crate::error::Result;
use crate::migration::extractor;
use crate::migration::replay::{ReplayEngine, TierReport};

/// Phase of a migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No backup on disk
    Fresh,
    Extracting,
    /// Extraction finished and its record was handed to the store
    Extracted,
    /// Backup on disk, loading it instead of extracting
    Resuming,
    Replaying,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Fresh => "fresh",
            Phase::Extracting => "extracting",
            Phase::Extracted => "extracted",
            Phase::Resuming => "resuming",
            Phase::Replaying => "replaying",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Accounts and pacing for one migration
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub source: Credentials,
    pub target: Credentials,
    pub follow_cooldown: Duration,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Phases visited, in order
    pub phases: Vec<Phase>,
    /// Final state of the record
    pub record: BackupRecord,
    pub tiers: Vec<TierReport>,
}

impl MigrationReport {
    pub fn extracted(&self) -> bool {
        self.phases.contains(&Phase::Extracting)
    }

    pub fn followed(&self) -> usize {
        self.tiers.iter().map(|t| t.followed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.tiers.iter().map(|t| t.skipped).sum()
    }
}

/// Drives extraction, persistence and replay
pub struct Migrator<L, S> {
    launcher: L,
    store: S,
    plan: MigrationPlan,
    phases: Vec<Phase>,
}

impl<L: SessionLauncher, S: BackupStore> Migrator<L, S> {
    pub fn new(launcher: L, store: S, plan: MigrationPlan) -> Self {
        Self {
            launcher,
            store,
            plan,
            phases: Vec::new(),
        }
    }

    fn enter(&mut self, phase: Phase) {
        tracing::info!(phase = %phase, "Migration phase");
        self.phases.push(phase);
    }

    pub async fn run(mut self) -> Result<MigrationReport> {
        // Extraction only runs without a backup, so a partially replayed
        // backup is never replaced by a newer listing.
        let record = if self.store.exists() {
            self.enter(Phase::Resuming);
            let record = self.store.load()?;
            if record.is_empty() {
                tracing::warn!("Backup lists no followed users");
            }
            record
        } else {
            self.enter(Phase::Fresh);
            self.enter(Phase::Extracting);
            let record = self.extract().await?;
            tracing::info!(total = record.total(), "Extraction finished");
            self.store.save(&record)?;
            self.enter(Phase::Extracted);
            record
        };

        self.enter(Phase::Replaying);
        let (record, tiers) = self.replay(record).await?;
        self.enter(Phase::Done);

        Ok(MigrationReport {
            phases: self.phases,
            record,
            tiers,
        })
    }

    async fn extract(&self) -> Result<BackupRecord> {
        let mut session = self.launcher.launch().await?;
        let result = Self::extract_with(session.as_mut(), &self.plan.source).await;
        close_session(session).await;
        result
    }

    async fn extract_with(
        session: &mut dyn BrowserSession,
        source: &Credentials,
    ) -> Result<BackupRecord> {
        session.login(source).await?;

        let mut record = BackupRecord::default();
        for tier in VisibilityTier::ALL {
            session.show_following(tier).await?;
            let ids = extractor::extract(session).await?;
            tracing::info!(tier = %tier, count = ids.len(), "Extracted following list");
            *record.ids_mut(tier) = ids;
        }
        Ok(record)
    }

    async fn replay(&self, record: BackupRecord) -> Result<(BackupRecord, Vec<TierReport>)> {
        if record.done.all_done() {
            tracing::info!("Every tier already replayed, nothing to do");
            let tiers = VisibilityTier::ALL
                .into_iter()
                .map(TierReport::already_done)
                .collect();
            return Ok((record, tiers));
        }

        let mut session = self.launcher.launch().await?;
        let result = self.replay_with(session.as_mut(), record).await;
        close_session(session).await;
        result
    }

    async fn replay_with(
        &self,
        session: &mut dyn BrowserSession,
        mut record: BackupRecord,
    ) -> Result<(BackupRecord, Vec<TierReport>)> {
        session.login(&self.plan.target).await?;

        let engine = ReplayEngine::new(self.plan.follow_cooldown);
        let mut reports = Vec::with_capacity(VisibilityTier::ALL.len());
        for tier in VisibilityTier::ALL {
            let already_done = record.done.is_done(tier);
            let report = engine
                .replay(session, tier, record.ids(tier), already_done)
                .await?;
            if !already_done {
                record.done.mark_done(tier);
                self.store.save(&record)?;
            }
            reports.push(report);
        }
        Ok((record, reports))
    }
}

/// Close a session, logging instead of failing so the original error wins
async fn close_session(session: Box<dyn BrowserSession>) {
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Failed to close browser session");
    }
}
