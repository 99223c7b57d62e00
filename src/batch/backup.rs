//! Backup orchestration
//!
//! Setup failures (db-list, recipient key, archive creation) abort the run.
//! After that each database is dumped, sealed and appended independently; a
//! failure skips that database and the rest carry on.

use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc;

use chrono::Local;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::archive::{is_valid_base_name, ArchiveBuilder, Manifest};
use crate::config::{load_db_list, BackupConfig};
use crate::crypto::{load_public_key, Envelope, EnvelopeEncryptor};
use crate::dump::{DatabaseRecord, Dumper};
use crate::error::{VaultError, VaultResult};

use super::observer::{BatchObserver, Stage};
use super::report::{BatchReport, ItemReport};

/// A database that made it through dump and encryption
struct Sealed {
    envelope: Envelope,
    plaintext_bytes: u64,
}

/// Why and where an item stopped
struct Skip {
    reached: Stage,
    error: VaultError,
}

type SealResult = Result<Sealed, Skip>;

/// Back up every database in the config's db-list into one archive
///
/// Returns the per-item report. When no database could be sealed no archive
/// is written and `report.output` is `None`.
///
/// # Errors
///
/// Setup failures and archive write failures. Per-database failures are
/// recorded in the report instead.
pub fn run_backup(
    config: &BackupConfig,
    dumper: &dyn Dumper,
    observer: &dyn BatchObserver,
) -> VaultResult<BatchReport> {
    config.validate()?;

    let list = load_db_list(&config.db_list)?;
    for missing in &list.missing {
        observer.on_warning(&format!(
            "Database file not found or is not a file: {}",
            missing.display()
        ));
    }

    let recipient = load_public_key(&config.public_key)?;
    info!(
        format = %recipient.format(),
        bits = recipient.modulus_bits(),
        "Loaded recipient key"
    );
    let encryptor = EnvelopeEncryptor::new(recipient)?;

    let destination = config.resolve_output(&Local::now().naive_local());
    if destination.exists() {
        observer.on_warning(&format!(
            "Output file {} already exists and will be overwritten",
            destination.display()
        ));
    }
    let mut builder = ArchiveBuilder::create(&destination)?;

    let mut report = BatchReport::default();
    let records = admit_records(list.records, observer, &mut report);

    if config.jobs <= 1 || records.len() <= 1 {
        for record in &records {
            let sealed = seal_one(record, dumper, &encryptor, observer);
            archive_one(&mut builder, record, sealed, observer, &mut report)?;
        }
    } else {
        seal_parallel(
            &records,
            config.jobs,
            dumper,
            &encryptor,
            observer,
            &mut builder,
            &mut report,
        )?;
    }

    if builder.envelope_count() == 0 {
        // Dropping the builder removes its temp file
        drop(builder);
        observer.on_warning("No database was backed up; no archive written");
        return Ok(report);
    }

    let databases = builder.envelope_count();
    let written = builder.finish(&Manifest::current())?;
    info!(archive = %written.display(), databases, "Archive written");
    report.output = Some(written);
    Ok(report)
}

/// Drop records whose base name can't be archived or was already taken
fn admit_records(
    records: Vec<DatabaseRecord>,
    observer: &dyn BatchObserver,
    report: &mut BatchReport,
) -> Vec<DatabaseRecord> {
    let mut seen = HashSet::new();
    let mut admitted = Vec::with_capacity(records.len());

    for record in records {
        let rejection = if !is_valid_base_name(record.base_name()) {
            Some(format!(
                "file name {:?} cannot be used as an archive entry name",
                record.base_name()
            ))
        } else if !seen.insert(record.base_name().to_string()) {
            Some(format!(
                "another database named '{}' is already in this backup ({})",
                record.base_name(),
                record.path().display()
            ))
        } else {
            None
        };

        match rejection {
            Some(reason) => {
                let error = VaultError::Config(reason);
                observer.on_skipped(record.base_name(), Stage::Pending, &error);
                report.push(ItemReport::skipped(record.base_name(), Stage::Pending, error));
            }
            None => admitted.push(record),
        }
    }

    admitted
}

/// Dump and encrypt one database
fn seal_one(
    record: &DatabaseRecord,
    dumper: &dyn Dumper,
    encryptor: &EnvelopeEncryptor,
    observer: &dyn BatchObserver,
) -> SealResult {
    let base = record.base_name();

    let plaintext = Zeroizing::new(dumper.dump(record).map_err(|error| Skip {
        reached: Stage::Pending,
        error,
    })?);
    observer.on_stage(base, Stage::Dumped);

    let envelope = encryptor.seal(base, &plaintext).map_err(|error| Skip {
        reached: Stage::Dumped,
        error,
    })?;
    observer.on_stage(base, Stage::Encrypted);

    Ok(Sealed {
        envelope,
        plaintext_bytes: plaintext.len() as u64,
    })
}

/// Append a sealed envelope, or record the skip
///
/// Archive write errors are returned; they end the whole run.
fn archive_one(
    builder: &mut ArchiveBuilder,
    record: &DatabaseRecord,
    sealed: SealResult,
    observer: &dyn BatchObserver,
    report: &mut BatchReport,
) -> VaultResult<()> {
    let base = record.base_name();

    match sealed {
        Ok(sealed) => {
            builder.append_envelope(&sealed.envelope)?;
            observer.on_stage(base, Stage::Archived);
            report.push(ItemReport::completed(base, sealed.plaintext_bytes, None));
        }
        Err(skip) => {
            observer.on_skipped(base, skip.reached, &skip.error);
            report.push(ItemReport::skipped(base, skip.reached, skip.error));
        }
    }

    Ok(())
}

/// Dump and seal on a bounded pool; this thread stays the only archive writer
///
/// Results are appended in db-list order whatever order workers finish in.
fn seal_parallel(
    records: &[DatabaseRecord],
    jobs: usize,
    dumper: &dyn Dumper,
    encryptor: &EnvelopeEncryptor,
    observer: &dyn BatchObserver,
    builder: &mut ArchiveBuilder,
    report: &mut BatchReport,
) -> VaultResult<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("dumpvault-worker-{}", i))
        .build()
        .map_err(|e| VaultError::Config(format!("Failed to start worker pool: {}", e)))?;

    debug!(jobs, databases = records.len(), "Sealing in parallel");

    let (tx, rx) = mpsc::sync_channel::<(usize, SealResult)>(jobs);

    pool.in_place_scope(|scope| {
        for (index, record) in records.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let result = seal_one(record, dumper, encryptor, observer);
                // The writer only hangs up after an archive error
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let mut pending = BTreeMap::new();
        let mut next = 0;
        for (index, result) in rx {
            pending.insert(index, result);
            while let Some(result) = pending.remove(&next) {
                archive_one(builder, &records[next], result, observer, report)?;
                next += 1;
            }
        }
        Ok(())
    })
}
