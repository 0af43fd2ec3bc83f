//! Backup artifact storage
//!
//! The backup is the only durable migration state. Every save writes a full
//! snapshot so that a crash right after any successful save resumes from it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::data::models::{dedup_ids, BackupRecord, VisibilityTier};
use crate::error::{MigrationError, Result};

/// Durable store for the migration record
pub trait BackupStore: Send + Sync {
    /// Whether a backup exists. Does not parse it.
    fn exists(&self) -> bool;

    /// Load the full record
    fn load(&self) -> Result<BackupRecord>;

    /// Replace the stored record with `record`
    fn save(&self, record: &BackupRecord) -> Result<()>;
}

/// JSON file backed store
///
/// With `persist` disabled, saves are skipped and a crash loses all progress.
/// An existing file is still detected and loaded.
#[derive(Debug, Clone)]
pub struct FileBackupStore {
    path: PathBuf,
    persist: bool,
}

impl FileBackupStore {
    pub fn new(path: impl Into<PathBuf>, persist: bool) -> Self {
        Self {
            path: path.into(),
            persist,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn persists(&self) -> bool {
        self.persist
    }

    fn parse(&self, contents: &str) -> Result<BackupRecord> {
        let mut record: BackupRecord = serde_json::from_str(contents)
            .map_err(|e| MigrationError::corrupt(&self.path, e.to_string()))?;

        for tier in VisibilityTier::ALL {
            let ids = record.ids_mut(tier);
            if ids.iter().any(|id| id.is_empty()) {
                return Err(MigrationError::corrupt(
                    &self.path,
                    format!("empty identifier in {tier} list"),
                ));
            }

            let before = ids.len();
            *ids = dedup_ids(std::mem::take(ids));
            if ids.len() != before {
                tracing::warn!(
                    path = %self.path.display(),
                    tier = %tier,
                    dropped = before - ids.len(),
                    "Dropped duplicate identifiers from backup"
                );
            }
        }

        Ok(record)
    }

    fn write_atomically(&self, contents: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| MigrationError::io(&dir, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| MigrationError::io(&dir, e))?;
        tmp.write_all(contents.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| MigrationError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| MigrationError::io(&self.path, e.error))?;
        Ok(())
    }
}

impl BackupStore for FileBackupStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<BackupRecord> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| MigrationError::io(&self.path, e))?;
        let record = self.parse(&contents)?;
        tracing::info!(
            path = %self.path.display(),
            public = record.public_followers.len(),
            private = record.private_followers.len(),
            done_public = record.done.public,
            done_private = record.done.private,
            "Loaded backup"
        );
        Ok(record)
    }

    fn save(&self, record: &BackupRecord) -> Result<()> {
        if !self.persist {
            tracing::debug!(path = %self.path.display(), "Backup disabled, skipping save");
            return Ok(());
        }

        let contents = serde_json::to_string_pretty(record)?;
        self.write_atomically(&contents)?;
        tracing::info!(
            path = %self.path.display(),
            done_public = record.done.public,
            done_private = record.done.private,
            "Saved backup"
        );
        Ok(())
    }
}

/// In-memory store that also keeps every saved snapshot
#[derive(Debug, Clone, Default)]
pub struct MemoryBackupStore {
    current: Arc<Mutex<Option<BackupRecord>>>,
    history: Arc<Mutex<Vec<BackupRecord>>>,
}

impl MemoryBackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an existing backup
    pub fn with_record(record: BackupRecord) -> Self {
        let store = Self::default();
        *store.current.lock() = Some(record);
        store
    }

    pub fn current(&self) -> Option<BackupRecord> {
        self.current.lock().clone()
    }

    /// Snapshots passed to `save`, oldest first
    pub fn saved(&self) -> Vec<BackupRecord> {
        self.history.lock().clone()
    }
}

impl BackupStore for MemoryBackupStore {
    fn exists(&self) -> bool {
        self.current.lock().is_some()
    }

    fn load(&self) -> Result<BackupRecord> {
        self.current.lock().clone().ok_or_else(|| {
            MigrationError::io(
                "<memory>",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no backup saved"),
            )
        })
    }

    fn save(&self, record: &BackupRecord) -> Result<()> {
        *self.current.lock() = Some(record.clone());
        self.history.lock().push(record.clone());
        Ok(())
    }
}
