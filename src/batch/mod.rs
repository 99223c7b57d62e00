//! Batch orchestration
//!
//! Drives every database (backup) or archive pair (restore) through its
//! stages, isolating per-item failures and reporting progress to an
//! injected [`BatchObserver`].

pub mod backup;
pub mod observer;
pub mod report;
pub mod restore;

pub use backup::run_backup;
pub use observer::{BatchObserver, SilentObserver, Stage, TracingObserver};
pub use report::{BatchReport, BatchStatus, ItemOutcome, ItemReport};
pub use restore::run_restore;
