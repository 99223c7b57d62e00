//! Batch outcome reporting

use std::path::PathBuf;

use crate::error::VaultError;

use super::observer::Stage;

/// How one item ended
#[derive(Debug)]
pub enum ItemOutcome {
    Completed {
        /// Plaintext dump size
        bytes: u64,
        /// File written for this item, if it has its own
        output: Option<PathBuf>,
    },
    Skipped {
        reached: Stage,
        error: VaultError,
    },
}

#[derive(Debug)]
pub struct ItemReport {
    pub base_name: String,
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub fn completed(base_name: impl Into<String>, bytes: u64, output: Option<PathBuf>) -> Self {
        Self {
            base_name: base_name.into(),
            outcome: ItemOutcome::Completed { bytes, output },
        }
    }

    pub fn skipped(base_name: impl Into<String>, reached: Stage, error: VaultError) -> Self {
        Self {
            base_name: base_name.into(),
            outcome: ItemOutcome::Skipped { reached, error },
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Completed { .. })
    }

    pub fn error(&self) -> Option<&VaultError> {
        match &self.outcome {
            ItemOutcome::Skipped { error, .. } => Some(error),
            ItemOutcome::Completed { .. } => None,
        }
    }
}

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every item completed
    Success,
    /// At least one item completed and at least one was skipped
    Partial,
    /// No item completed
    NothingSucceeded,
}

impl BatchStatus {
    /// Process exit code; fatal setup errors use 1 and never reach here
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 2,
            Self::NothingSucceeded => 3,
        }
    }
}

/// Per-item results of a backup or restore run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
    /// Archive written (backup) or directory written to (restore)
    pub output: Option<PathBuf>,
}

impl BatchReport {
    pub fn push(&mut self, item: ItemReport) {
        self.items.push(item);
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_completed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn status(&self) -> BatchStatus {
        match (self.succeeded(), self.skipped()) {
            (0, _) => BatchStatus::NothingSucceeded,
            (_, 0) => BatchStatus::Success,
            _ => BatchStatus::Partial,
        }
    }
}
