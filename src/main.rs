use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dumpvault::cli::{
    handle_backup_command, handle_inspect_command, handle_restore_command, BackupArgs,
    InspectArgs, RestoreArgs,
};
use dumpvault::logging::{self, Verbosity};
use dumpvault::VaultError;

#[derive(Parser)]
#[command(
    name = "dumpvault",
    author = "Kaylee Beyene",
    version,
    about = "Encrypted SQLite backup and restore",
    long_about = "dumpvault dumps SQLite databases to SQL text, encrypts each dump with a \
                  fresh AES-256-GCM key, wraps that key for an RSA recipient and bundles \
                  everything into one tar.gz archive. Restore reverses it with the private key.\n\n\
                  Exit codes: 0 success, 1 fatal error, 2 some databases skipped, \
                  3 no database succeeded."
)]
struct Cli {
    /// Show per-stage progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump, encrypt and archive the databases in a db-list file
    Backup(BackupArgs),

    /// Decrypt an archive into .sql dumps
    Restore(RestoreArgs),

    /// List what an archive contains without decrypting it
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Help and version go to stdout and are not failures
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = logging::init(Verbosity::from_flags(cli.verbose, cli.quiet)) {
        eprintln!("Warning: {}", e);
    }

    match run(cli.command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(vault) = e.downcast_ref::<VaultError>() {
                eprintln!("Hint: {}", vault.remediation());
            }
            ExitCode::from(1)
        }
    }
}

fn run(command: Commands) -> Result<u8> {
    match command {
        Commands::Backup(args) => {
            let report = handle_backup_command(args).context("Backup aborted")?;
            Ok(report.status().exit_code())
        }
        Commands::Restore(args) => {
            let report = handle_restore_command(args).context("Restore aborted")?;
            Ok(report.status().exit_code())
        }
        Commands::Inspect(args) => {
            handle_inspect_command(args).context("Inspect failed")?;
            Ok(0)
        }
    }
}
