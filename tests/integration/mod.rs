//! Integration tests for the migrator
//!
//! These tests drive the public API end to end against a scripted site.

#[path = "../common/mod.rs"]
pub mod common;

pub mod backup_roundtrip;
pub mod cli;
pub mod migration_flow;
