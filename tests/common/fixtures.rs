//! Fixtures for end-to-end migration tests

use std::path::PathBuf;
use std::time::Duration;

use follow_migrator::browser::MockPlatform;
use follow_migrator::{Credentials, FileBackupStore, MigrationPlan, RelationshipId, VisibilityTier};
use tempfile::TempDir;

pub const OLD_ACCOUNT: &str = "old-account";
pub const NEW_ACCOUNT: &str = "new-account";

/// Migration plan with no follow cooldown
pub fn test_plan() -> MigrationPlan {
    MigrationPlan {
        source: Credentials::new(OLD_ACCOUNT, "old-password"),
        target: Credentials::new(NEW_ACCOUNT, "new-password"),
        follow_cooldown: Duration::ZERO,
    }
}

/// Site where the old account follows 10 and 20 publicly and 30 privately.
/// The public list spans two pages and contains a pending request.
pub fn scripted_site() -> MockPlatform {
    MockPlatform::new()
        .with_pages(
            VisibilityTier::Public,
            &[
                &["/en/users/10", "/en/users/10", "/en/users/99/request"],
                &["/en/users/20"],
            ],
        )
        .with_pages(VisibilityTier::Private, &[&["/en/users/30"]])
}

/// Backup file location inside a fresh temporary directory
pub fn backup_location() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("backup.json");
    (dir, path)
}

pub fn file_store(path: &PathBuf, persist: bool) -> FileBackupStore {
    FileBackupStore::new(path.clone(), persist)
}

pub fn ids(raw: &[&str]) -> Vec<RelationshipId> {
    raw.iter().map(|s| RelationshipId::from(*s)).collect()
}

/// Read the backup file as raw JSON
pub fn read_artifact(path: &PathBuf) -> serde_json::Value {
    let raw = std::fs::read_to_string(path).expect("Backup file should exist");
    serde_json::from_str(&raw).expect("Backup file should be JSON")
}
