//! Display formatting for terminal output
//!
//! Provides the batch summary table and the archive listing printed by the
//! CLI commands.

pub mod archive;
pub mod batch;
pub mod report;

pub use archive::format_archive_listing;
pub use batch::format_batch_summary;
