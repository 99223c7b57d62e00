//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the batch orchestrator.

pub mod backup;
pub mod inspect;
pub mod prompt;
pub mod restore;

pub use backup::{handle_backup_command, BackupArgs};
pub use inspect::{handle_inspect_command, InspectArgs};
pub use prompt::TerminalPrompt;
pub use restore::{handle_restore_command, RestoreArgs};
