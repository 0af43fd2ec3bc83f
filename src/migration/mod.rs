//! Scrape, persist and replay

pub mod extractor;
pub mod orchestrator;
pub mod replay;

pub use extractor::{extract, filter_page_links};
pub use orchestrator::{MigrationPlan, MigrationReport, Migrator, Phase};
pub use replay::{ReplayEngine, TierReport};
