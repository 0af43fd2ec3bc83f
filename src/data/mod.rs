//! Data persistence layer
//!
//! The migration record and the backup store that makes it durable.

mod backup;
mod models;

pub use backup::{BackupStore, FileBackupStore, MemoryBackupStore};
pub use models::{dedup_ids, BackupRecord, Completion, RelationshipId, VisibilityTier};
