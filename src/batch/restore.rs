//! Restore orchestration
//!
//! The archive is read and the private key loaded before anything is
//! written. Each pair is then unwrapped, decrypted and written on its own;
//! a pair that fails leaves no file behind and does not affect the others.

use std::fs;

use tracing::info;
use zeroize::Zeroizing;

use crate::archive::{ArchivePair, ArchiveReader};
use crate::config::RestoreConfig;
use crate::crypto::{load_private_key, EnvelopeDecryptor, PassphrasePrompt};
use crate::error::{VaultError, VaultResult};
use crate::file_io::write_atomic;

use super::observer::{BatchObserver, Stage};
use super::report::{BatchReport, ItemReport};

/// Restore every complete pair in the archive to `<output_dir>/<base>.sql`
///
/// # Errors
///
/// Unreadable archive, unusable private key, or an output directory that
/// can't be created. Per-pair failures are recorded in the report.
pub fn run_restore(
    config: &RestoreConfig,
    prompt: &dyn PassphrasePrompt,
    observer: &dyn BatchObserver,
) -> VaultResult<BatchReport> {
    let contents = ArchiveReader::open(&config.archive)?.read()?;
    for warning in &contents.warnings {
        observer.on_warning(warning);
    }
    observer.on_manifest(&contents.manifest);

    let private_key = load_private_key(&config.private_key, config.passphrase.as_ref(), prompt)?;
    info!(
        format = %private_key.format(),
        bits = private_key.modulus_bits(),
        "Loaded private key"
    );
    let decryptor = EnvelopeDecryptor::new(private_key);

    fs::create_dir_all(&config.output_dir).map_err(|e| {
        VaultError::Config(format!(
            "Failed to create output directory {}: {}",
            config.output_dir.display(),
            e
        ))
    })?;

    let mut report = BatchReport::default();
    for pair in contents.pairs {
        let base = pair.base_name.clone();
        match restore_one(pair, &decryptor, config, observer) {
            Ok(item) => report.push(item),
            Err((reached, error)) => {
                observer.on_skipped(&base, reached, &error);
                report.push(ItemReport::skipped(base, reached, error));
            }
        }
    }

    info!(
        output_dir = %config.output_dir.display(),
        restored = report.succeeded(),
        skipped = report.skipped(),
        "Restore finished"
    );
    report.output = Some(config.output_dir.clone());
    Ok(report)
}

fn restore_one(
    pair: ArchivePair,
    decryptor: &EnvelopeDecryptor,
    config: &RestoreConfig,
    observer: &dyn BatchObserver,
) -> Result<ItemReport, (Stage, VaultError)> {
    let envelope = pair.into_envelope().map_err(|e| (Stage::Pending, e))?;
    let base = envelope.base_name();
    observer.on_stage(base, Stage::PairResolved);

    let key = decryptor
        .unwrap_key(envelope.wrapped_key())
        .map_err(|e| (Stage::PairResolved, e))?;
    observer.on_stage(base, Stage::KeyUnwrapped);

    let plaintext = Zeroizing::new(
        decryptor
            .decrypt(envelope.ciphertext(), &key)
            .map_err(|e| (Stage::KeyUnwrapped, e))?,
    );
    observer.on_stage(base, Stage::Decrypted);

    let target = config.output_path(base);
    if target.exists() {
        observer.on_warning(&format!(
            "Output file {} already exists and will be overwritten",
            target.display()
        ));
    }
    write_atomic(&target, &plaintext).map_err(|e| (Stage::Decrypted, e))?;
    observer.on_stage(base, Stage::Written);

    Ok(ItemReport::completed(
        base,
        plaintext.len() as u64,
        Some(target),
    ))
}
