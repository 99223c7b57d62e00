//! Backup command

use std::path::PathBuf;

use clap::Args;

use crate::batch::{run_backup, BatchReport, TracingObserver};
use crate::config::settings::{DEFAULT_ARCHIVE_NAME, DEFAULT_JOBS};
use crate::config::BackupConfig;
use crate::display::format_batch_summary;
use crate::dump::SqliteDumper;
use crate::error::VaultResult;

/// Dump, encrypt and archive the databases listed in a db-list file
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// JSON file listing the databases: [{"path": "..."}, ...]
    pub db_list: PathBuf,

    /// Recipient RSA public key (PEM or OpenSSH format)
    #[arg(env = "DUMPVAULT_PUBLIC_KEY")]
    pub public_key: PathBuf,

    /// Output archive, or a directory to put a timestamped archive in
    #[arg(short, long, env = "DUMPVAULT_OUTPUT", default_value = DEFAULT_ARCHIVE_NAME)]
    pub output: PathBuf,

    /// Number of databases to dump and encrypt concurrently
    #[arg(short, long, default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,
}

impl BackupArgs {
    pub fn to_config(&self) -> BackupConfig {
        BackupConfig::new(&self.db_list, &self.public_key)
            .with_output(&self.output)
            .with_jobs(self.jobs)
    }
}

/// Handle the backup command
pub fn handle_backup_command(args: BackupArgs) -> VaultResult<BatchReport> {
    let config = args.to_config();
    let report = run_backup(&config, &SqliteDumper::new(), &TracingObserver)?;

    println!("{}", format_batch_summary(&report, "backed up"));
    Ok(report)
}
