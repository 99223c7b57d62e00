//! Logging setup for the dumpvault binary
//!
//! Logs go to stderr through `tracing-subscriber` so stdout only carries the
//! summary tables. `RUST_LOG` takes precedence over the command-line flags.

use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::{VaultError, VaultResult};

/// How chatty the binary is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet,
    #[default]
    Normal,
    /// Per-stage progress and library detail
    Verbose,
}

impl Verbosity {
    /// `quiet` wins if both flags are somehow set
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (_, true) => Self::Quiet,
            (true, false) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "warn,dumpvault=info",
            Self::Verbose => "info,dumpvault=debug",
        }
    }
}

/// Build the level filter, preferring `RUST_LOG` when it parses
pub fn build_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()))
}

/// Install the global subscriber
///
/// # Errors
///
/// Returns [`VaultError::Config`] if a global subscriber is already set.
pub fn init(verbosity: Verbosity) -> VaultResult<()> {
    tracing_subscriber::registry()
        .with(build_filter(verbosity))
        .with(
            layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| VaultError::Config(format!("Failed to initialize logging: {}", e)))
}
