//! Archive listing for the inspect command

use crate::archive::{ArchiveContents, ManifestStatus};

use super::report::{column_width, format_bytes};

/// Format entries, pairing status, manifest and warnings of an archive
pub fn format_archive_listing(contents: &ArchiveContents) -> String {
    let name_width = column_width(contents.entries.iter().map(|e| e.name.as_str()), 5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<12}  {:>10}\n",
        "Entry",
        "Kind",
        "Size",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<12}  {:->10}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));
    for entry in &contents.entries {
        output.push_str(&format!(
            "{:<name_width$}  {:<12}  {:>10}\n",
            entry.name,
            entry.kind.label(),
            format_bytes(entry.size),
            name_width = name_width,
        ));
    }
    output.push('\n');

    let complete = contents.complete_pairs();
    output.push_str(&format!(
        "Pairs: {} complete, {} incomplete\n",
        complete,
        contents.pairs.len() - complete
    ));
    for pair in contents.pairs.iter().filter(|p| !p.is_complete()) {
        let missing = if pair.ciphertext.is_none() {
            "ciphertext"
        } else {
            "wrapped key"
        };
        output.push_str(&format!("  {}: missing {}\n", pair.base_name, missing));
    }

    match &contents.manifest {
        ManifestStatus::Parsed(m) => {
            output.push_str(&format!("Manifest: version {} ({})\n", m.version, m.tool));
            output.push_str(&format!("  encryption: {}\n", m.encryption_info));
            output.push_str(&format!("  rsa: {}\n", m.rsa_key_details));
            output.push_str(&format!("  aes: {}\n", m.aes_details));
        }
        ManifestStatus::Unparseable(reason) => {
            output.push_str(&format!("Manifest: unreadable ({})\n", reason));
        }
        ManifestStatus::Absent => output.push_str("Manifest: none\n"),
    }

    if !contents.warnings.is_empty() {
        output.push_str("Warnings:\n");
        for warning in &contents.warnings {
            output.push_str(&format!("  {}\n", warning));
        }
    }

    output
}
