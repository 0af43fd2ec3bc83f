//! End-to-end migration runs against a scripted site with a file-backed store

use follow_migrator::browser::MockCall;
use follow_migrator::{BackupStore, MigrationError, Migrator, Phase, VisibilityTier};

use super::common::fixtures::{
    backup_location, file_store, ids, read_artifact, scripted_site, test_plan, NEW_ACCOUNT,
    OLD_ACCOUNT,
};

/// Fresh run with persistence: artifact checkpoints after extraction, then completes
#[tokio::test]
async fn test_fresh_migration_writes_checkpoints() {
    let site = scripted_site();
    let (_dir, path) = backup_location();

    // Crash the replay on its first profile to observe the post-extraction artifact.
    site.failing_on_profile("10");
    let err = Migrator::new(site.launcher(), file_store(&path, true), test_plan())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::Browser(_)));

    let artifact = read_artifact(&path);
    assert_eq!(
        artifact,
        serde_json::json!({
            "public_followers": ["10", "20"],
            "private_followers": ["30"],
            "done": { "public": false, "private": false }
        })
    );

    let report = Migrator::new(site.launcher(), file_store(&path, true), test_plan())
        .run()
        .await
        .unwrap();

    assert_eq!(report.phases.first(), Some(&Phase::Resuming));
    assert_eq!(report.followed(), 3);
    let artifact = read_artifact(&path);
    assert_eq!(artifact["done"]["public"], true);
    assert_eq!(artifact["done"]["private"], true);
    assert_eq!(artifact["public_followers"], serde_json::json!(["10", "20"]));

    assert_eq!(site.follow_state("10"), Some(VisibilityTier::Public));
    assert_eq!(site.follow_state("20"), Some(VisibilityTier::Public));
    assert_eq!(site.follow_state("30"), Some(VisibilityTier::Private));
    assert_eq!(site.follow_state("99"), None);
}

/// Uninterrupted run logs in to the old account, then the new one
#[tokio::test]
async fn test_single_run_migrates_everything() {
    let site = scripted_site();
    let (_dir, path) = backup_location();

    let report = Migrator::new(site.launcher(), file_store(&path, true), test_plan())
        .run()
        .await
        .unwrap();

    assert!(report.extracted());
    assert!(report.record.done.all_done());
    assert_eq!(
        site.calls()
            .into_iter()
            .filter(|c| matches!(c, MockCall::Login(_)))
            .collect::<Vec<_>>(),
        vec![
            MockCall::Login(OLD_ACCOUNT.to_string()),
            MockCall::Login(NEW_ACCOUNT.to_string())
        ]
    );
    assert_eq!(read_artifact(&path)["done"]["private"], true);
}

/// Backup marks public done: no public navigation, every private id visited
#[tokio::test]
async fn test_resume_replays_only_the_pending_tier() {
    let site = scripted_site();
    let (_dir, path) = backup_location();
    std::fs::write(
        &path,
        r#"{
  "public_followers": ["1", "2"],
  "private_followers": ["3", "4", "5"],
  "done": { "public": true, "private": false }
}"#,
    )
    .unwrap();

    let report = Migrator::new(site.launcher(), file_store(&path, true), test_plan())
        .run()
        .await
        .unwrap();

    assert!(!report.extracted());
    assert_eq!(site.profile_visits(), ids(&["3", "4", "5"]));
    assert_eq!(
        site.count(|c| matches!(c, MockCall::SelectFollowPrivately(_))),
        3
    );
    assert_eq!(site.count(|c| matches!(c, MockCall::ClickFollow(_))), 0);
    assert!(file_store(&path, true).load().unwrap().done.all_done());
}

/// Without persistence nothing is written and a rerun starts over
#[tokio::test]
async fn test_disabled_backup_reruns_from_scratch() {
    let site = scripted_site();
    let (_dir, path) = backup_location();

    Migrator::new(site.launcher(), file_store(&path, false), test_plan())
        .run()
        .await
        .unwrap();
    assert!(!path.exists());

    site.clear_calls();
    let report = Migrator::new(site.launcher(), file_store(&path, false), test_plan())
        .run()
        .await
        .unwrap();

    assert!(report.extracted());
    // Everything is already followed, so the rerun only visits profiles.
    assert_eq!(report.followed(), 0);
    assert_eq!(report.skipped(), 3);
}

/// A corrupt backup aborts before any browser is launched
#[tokio::test]
async fn test_corrupt_backup_aborts_startup() {
    let site = scripted_site();
    let (_dir, path) = backup_location();
    std::fs::write(&path, r#"{"public_followers": "10"}"#).unwrap();

    let err = Migrator::new(site.launcher(), file_store(&path, true), test_plan())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::CorruptBackup { .. }));
    assert!(site.calls().is_empty());
}
