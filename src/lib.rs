//! dumpvault - Encrypted SQLite backup and restore
//!
//! Each database is dumped to portable SQL text, sealed with a fresh
//! AES-256-GCM key, and that key is wrapped with the recipient's RSA public
//! key (OAEP, SHA-256). All envelopes go into a single gzip-compressed tar
//! archive alongside a manifest. Restore needs only the archive and the
//! matching private key.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `crypto`: key loading, AES-256-GCM and the envelope scheme
//! - `dump`: the `Dumper` seam and the SQLite implementation
//! - `archive`: tar.gz container writing, reading and pairing
//! - `batch`: backup and restore orchestration with per-item isolation
//! - `config`: db-list parsing and explicit run settings
//! - `cli`, `display`, `logging`: the binary's surface
//! - `error`: the error taxonomy
//!
//! # Example
//!
//! ```rust,ignore
//! use dumpvault::batch::{run_backup, TracingObserver};
//! use dumpvault::config::BackupConfig;
//! use dumpvault::dump::SqliteDumper;
//!
//! let config = BackupConfig::new("dbs.json", "recipient.pem").with_output("nightly.tar.gz");
//! let report = run_backup(&config, &SqliteDumper::new(), &TracingObserver)?;
//! std::process::exit(report.status().exit_code().into());
//! ```

pub mod archive;
pub mod batch;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod dump;
pub mod error;
pub mod file_io;
pub mod logging;

pub use error::{VaultError, VaultResult};
