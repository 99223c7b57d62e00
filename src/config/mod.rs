//! Configuration module for dumpvault
//!
//! This module provides:
//! - db-list file parsing into [`DatabaseRecord`](crate::dump::DatabaseRecord)s
//! - explicit backup and restore settings handed to the orchestrator

pub mod db_list;
pub mod settings;

pub use db_list::{load_db_list, DbList};
pub use settings::{BackupConfig, RestoreConfig};
