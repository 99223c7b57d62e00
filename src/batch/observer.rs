//! Progress reporting seam for batch runs

use std::fmt;

use tracing::{debug, info, warn};

use crate::archive::ManifestStatus;
use crate::error::VaultError;

/// Furthest point an item reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Pending,
    // backup
    Dumped,
    Encrypted,
    Archived,
    // restore
    PairResolved,
    KeyUnwrapped,
    Decrypted,
    Written,
}

impl Stage {
    /// Whether an item at this stage has nothing left to do
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Archived | Self::Written)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Dumped => "dumped",
            Self::Encrypted => "encrypted",
            Self::Archived => "archived",
            Self::PairResolved => "pair resolved",
            Self::KeyUnwrapped => "key unwrapped",
            Self::Decrypted => "decrypted",
            Self::Written => "written",
        };
        f.write_str(name)
    }
}

/// Receives item progress from the orchestrator
///
/// Backup calls may arrive from worker threads, hence `Send + Sync`.
pub trait BatchObserver: Send + Sync {
    fn on_stage(&self, base_name: &str, stage: Stage);

    /// `reached` is the last stage completed before the failure
    fn on_skipped(&self, base_name: &str, reached: Stage, error: &VaultError);

    fn on_warning(&self, message: &str);

    fn on_manifest(&self, _manifest: &ManifestStatus) {}
}

/// Logs progress through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl BatchObserver for TracingObserver {
    fn on_stage(&self, base_name: &str, stage: Stage) {
        if stage.is_final() {
            info!(database = base_name, "{}", stage);
        } else {
            debug!(database = base_name, "{}", stage);
        }
    }

    fn on_skipped(&self, base_name: &str, reached: Stage, error: &VaultError) {
        warn!(
            database = base_name,
            reached = %reached,
            kind = error.kind(),
            "Skipping: {} ({})",
            error,
            error.remediation()
        );
    }

    fn on_warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn on_manifest(&self, manifest: &ManifestStatus) {
        match manifest {
            ManifestStatus::Parsed(m) => {
                info!(version = %m.version, tool = %m.tool, "Found manifest")
            }
            ManifestStatus::Unparseable(_) => debug!("Manifest present but unreadable"),
            ManifestStatus::Absent => debug!("Archive has no manifest"),
        }
    }
}

/// Drops everything; for library callers and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl BatchObserver for SilentObserver {
    fn on_stage(&self, _base_name: &str, _stage: Stage) {}
    fn on_skipped(&self, _base_name: &str, _reached: Stage, _error: &VaultError) {}
    fn on_warning(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::KeyUnwrapped.to_string(), "key unwrapped");
        assert_eq!(Stage::Archived.to_string(), "archived");
    }

    #[test]
    fn test_final_stages() {
        assert!(Stage::Archived.is_final());
        assert!(Stage::Written.is_final());
        assert!(!Stage::Decrypted.is_final());
        assert!(!Stage::Pending.is_final());
    }
}
