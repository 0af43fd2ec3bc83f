//! Binary checks that need no browser

use assert_cmd::Command;
use predicates::prelude::*;

fn migrator_cmd() -> Command {
    let mut cmd = Command::cargo_bin("follow-migrator").unwrap();
    cmd.env_clear();
    cmd
}

#[test]
fn test_missing_credentials_fail() {
    let dir = tempfile::tempdir().unwrap();
    migrator_cmd()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("OLD_ACCOUNT_USERNAME").or(predicate::str::contains("--old-username")));
}

#[test]
fn test_help_lists_environment_options() {
    migrator_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GENERATE_BACKUP_FILE"))
        .stdout(predicate::str::contains("BACKUP_FILE_PATH"));
}

#[test]
fn test_corrupt_backup_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("backup.json"), "not json").unwrap();

    migrator_cmd()
        .current_dir(dir.path())
        .args([
            "--old-username",
            "old",
            "--old-password",
            "old-pw",
            "--new-username",
            "new",
            "--new-password",
            "new-pw",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));
}
