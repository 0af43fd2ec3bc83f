pub mod browser;
pub mod config;
pub mod data;
pub mod error;
pub mod migration;

pub use browser::{BrowserSession, ChromiumLauncher, SessionLauncher};
pub use config::{Config, Credentials};
pub use data::{BackupRecord, BackupStore, FileBackupStore, RelationshipId, VisibilityTier};
pub use error::{MigrationError, Result};
pub use migration::{MigrationPlan, MigrationReport, Migrator, Phase};
