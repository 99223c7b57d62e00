//! Backup and restore settings
//!
//! The orchestrator takes these as explicit values; nothing in the core reads
//! environment variables or global state. The CLI layer fills them from
//! arguments and environment fallbacks.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::crypto::SecureString;
use crate::error::{VaultError, VaultResult};

/// Archive written when no output is given
pub const DEFAULT_ARCHIVE_NAME: &str = "encrypted_backup.tar.gz";

/// Directory restored dumps go to when none is given
pub const DEFAULT_RESTORE_DIR: &str = "decrypted_dumps";

/// Sequential by default
pub const DEFAULT_JOBS: usize = 1;

/// Archive file name used when the output is a directory
pub fn timestamped_archive_name(now: &NaiveDateTime) -> String {
    format!("backup_{}.tar.gz", now.format("%Y%m%d_%H%M%S"))
}

/// Settings for one backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    /// JSON file listing the databases
    pub db_list: PathBuf,
    /// Recipient RSA public key
    pub public_key: PathBuf,
    /// Output archive file, or a directory to place a timestamped archive in
    pub output: PathBuf,
    /// Worker count for dump and encryption
    pub jobs: usize,
}

impl BackupConfig {
    pub fn new(db_list: impl Into<PathBuf>, public_key: impl Into<PathBuf>) -> Self {
        Self {
            db_list: db_list.into(),
            public_key: public_key.into(),
            output: PathBuf::from(DEFAULT_ARCHIVE_NAME),
            jobs: DEFAULT_JOBS,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Check option values that clap cannot
    pub fn validate(&self) -> VaultResult<()> {
        if self.jobs == 0 {
            return Err(VaultError::Config("jobs must be at least 1".into()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(VaultError::Config("output path is empty".into()));
        }
        Ok(())
    }

    /// Final archive path: `output` itself, or a timestamped file inside it
    /// when `output` is an existing directory
    pub fn resolve_output(&self, now: &NaiveDateTime) -> PathBuf {
        if self.output.is_dir() {
            self.output.join(timestamped_archive_name(now))
        } else {
            self.output.clone()
        }
    }
}

/// Settings for one restore run
#[derive(Debug, Clone)]
pub struct RestoreConfig {
    /// Archive to restore from
    pub archive: PathBuf,
    /// RSA private key matching the backup's recipient key
    pub private_key: PathBuf,
    /// Directory the `.sql` dumps are written to
    pub output_dir: PathBuf,
    /// Passphrase for an encrypted private key, if known up front
    pub passphrase: Option<SecureString>,
}

impl RestoreConfig {
    pub fn new(archive: impl Into<PathBuf>, private_key: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            private_key: private_key.into(),
            output_dir: PathBuf::from(DEFAULT_RESTORE_DIR),
            passphrase: None,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_passphrase(mut self, passphrase: Option<SecureString>) -> Self {
        self.passphrase = passphrase;
        self
    }

    /// Where the dump for `base_name` is written
    pub fn output_path(&self, base_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.sql", base_name))
    }
}
