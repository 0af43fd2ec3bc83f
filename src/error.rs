//! Error types shared by every migration phase

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Fatal migration errors.
///
/// There is no retry layer: any of these aborts the run, and the next
/// invocation resumes from whatever the backup store last saved.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },
    #[error("Backup file {path} is corrupt: {reason}")]
    CorruptBackup { path: PathBuf, reason: String },
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Login failed for account {username}")]
    AuthenticationFailure { username: String },
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Failed to encode backup: {0}")]
    Encode(#[from] serde_json::Error),
}

impl MigrationError {
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        MigrationError::Timeout {
            what: what.into(),
            after,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MigrationError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MigrationError::CorruptBackup {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, MigrationError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
