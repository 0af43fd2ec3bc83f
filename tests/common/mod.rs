//! Shared test utilities
//!
//! - Scripted site fixtures
//! - Backup file fixtures

pub mod fixtures;
