//! Restore command

use std::path::PathBuf;

use clap::Args;

use crate::batch::{run_restore, BatchReport, TracingObserver};
use crate::config::settings::DEFAULT_RESTORE_DIR;
use crate::config::RestoreConfig;
use crate::crypto::SecureString;
use crate::display::format_batch_summary;
use crate::error::VaultResult;

use super::prompt::TerminalPrompt;

/// Decrypt the dumps in an archive with the recipient's private key
#[derive(Args)]
pub struct RestoreArgs {
    /// Encrypted archive produced by `backup`
    pub archive: PathBuf,

    /// RSA private key (PKCS#8, PKCS#1 or OpenSSH format)
    pub private_key: PathBuf,

    /// Directory the .sql dumps are written to
    #[arg(short, long = "output-dir", default_value = DEFAULT_RESTORE_DIR)]
    pub output_dir: PathBuf,

    /// Passphrase of an encrypted private key; prompted for when needed
    #[arg(
        short,
        long,
        env = "DUMPVAULT_KEY_PASSPHRASE",
        hide_env_values = true
    )]
    pub passphrase: Option<String>,
}

impl RestoreArgs {
    pub fn into_config(self) -> RestoreConfig {
        RestoreConfig::new(self.archive, self.private_key)
            .with_output_dir(self.output_dir)
            .with_passphrase(self.passphrase.map(SecureString::from))
    }
}

/// Handle the restore command
pub fn handle_restore_command(args: RestoreArgs) -> VaultResult<BatchReport> {
    let config = args.into_config();
    let report = run_restore(&config, &TerminalPrompt, &TracingObserver)?;

    println!("{}", format_batch_summary(&report, "restored"));
    Ok(report)
}
