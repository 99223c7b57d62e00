//! Inspect command

use std::path::PathBuf;

use clap::Args;

use crate::archive::{ArchiveContents, ArchiveReader};
use crate::display::format_archive_listing;
use crate::error::VaultResult;

/// List the entries, pairing and manifest of an archive; no key needed
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Encrypted archive produced by `backup`
    pub archive: PathBuf,
}

/// Handle the inspect command
pub fn handle_inspect_command(args: InspectArgs) -> VaultResult<ArchiveContents> {
    let contents = ArchiveReader::open(&args.archive)?.read()?;
    print!("{}", format_archive_listing(&contents));
    Ok(contents)
}
