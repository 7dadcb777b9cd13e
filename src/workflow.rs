//! Path-level passes: protect, verify, repair, simulate damage
//!
//! These tie the core algorithms to files on disk and their companion
//! artifacts. The demo pass runs the whole cycle the way the command line
//! tool presents it: protect, corrupt a copy, detect, recover, detect again.

use crate::checksum::{create_checksums, read_checksums, ChecksumArtifact};
use crate::config::{DamageConfig, ProtectionConfig};
use crate::damage::{inject_damage, DamageEvent, DamageSource};
use crate::detect::{detect, DamagedBlocks};
use crate::domain::{BlockIndex, GroupWidth, DIGEST_SIZE};
use crate::error::Result;
use crate::file_ops::{self, CompanionFiles};
use crate::geometry::StripeGeometry;
use crate::parity::{write_parity, write_parity_parallel, ParityReader};
use crate::recovery::{recover, RecoveryReport};
use crate::reporters::{PassReporter, ProtectReporter, RepairReporter, VerifyReporter};
use log::{info, warn};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// What a protection pass produced
#[derive(Debug, Clone)]
pub struct ProtectionSummary {
    pub geometry: StripeGeometry,
    pub companions: CompanionFiles,
    pub parity_blocks: u64,
    pub digests: usize,
}

/// Write the redundancy and checksum artifacts for `path`.
///
/// On failure any partially written artifact is removed.
pub fn protect_file<R: ProtectReporter + ?Sized>(
    path: &Path,
    config: &ProtectionConfig,
    reporter: &R,
) -> Result<ProtectionSummary> {
    let companions = CompanionFiles::for_file(path)?;
    let geometry = StripeGeometry::new(file_ops::file_len(path)?, config.group_width);
    reporter.report_protect_start(path, &geometry);

    let parity_blocks = write_redundancy(path, &geometry, &companions.redundancy, config)
        .inspect_err(|_| discard(&companions.redundancy))?;
    reporter.report_artifact_written(&companions.redundancy, geometry.parity_len());

    let digests = write_checksums(path, &companions.checksums)
        .inspect_err(|_| discard(&companions.checksums))?;
    reporter.report_artifact_written(&companions.checksums, (digests * DIGEST_SIZE) as u64);

    info!(
        "protected {}: {} parity blocks, {} digests",
        path.display(),
        parity_blocks,
        digests
    );
    Ok(ProtectionSummary {
        geometry,
        companions,
        parity_blocks,
        digests,
    })
}

fn write_redundancy(
    path: &Path,
    geometry: &StripeGeometry,
    target: &Path,
    config: &ProtectionConfig,
) -> Result<u64> {
    let mut out = BufWriter::new(file_ops::create(target)?);
    let threads = config.effective_threads();
    if threads > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => return pool.install(|| write_parity_parallel(path, geometry, &mut out)),
            Err(e) => warn!(
                "Could not build a {} thread pool ({}), computing parity sequentially",
                threads, e
            ),
        }
    }
    let mut source = file_ops::open_read(path)?;
    write_parity(&mut source, geometry, &mut out)
}

fn write_checksums(path: &Path, target: &Path) -> Result<usize> {
    let mut source = BufReader::new(file_ops::open_read(path)?);
    let mut out = BufWriter::new(file_ops::create(target)?);
    create_checksums(&mut source, &mut out)
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Could not remove partial artifact {}: {}", path.display(), e);
    }
}

/// Load the checksum artifact that belongs to `path`
pub fn load_checksums(path: &Path) -> Result<ChecksumArtifact> {
    let companions = CompanionFiles::for_file(path)?;
    let mut reader = BufReader::new(file_ops::open_read(&companions.checksums)?);
    read_checksums(&mut reader)
}

/// Detect damaged blocks in `path` against its stored checksums
pub fn verify_file<R: VerifyReporter + ?Sized>(path: &Path, reporter: &R) -> Result<DamagedBlocks> {
    let checksums = load_checksums(path)?;
    reporter.report_verifying_file(path);

    let mut file = BufReader::new(file_ops::open_read(path)?);
    let damaged = detect(&mut file, &checksums)?;
    reporter.report_damaged_blocks(path, &damaged);
    Ok(damaged)
}

/// Rebuild `damaged` blocks of `path` in place from its redundancy file.
///
/// The stripe layout is derived from the length the file has now, which is
/// the same length it had when it was protected unless it was truncated or
/// extended since.
pub fn repair_file<R: RepairReporter + ?Sized>(
    path: &Path,
    damaged: &[BlockIndex],
    width: GroupWidth,
    reporter: &R,
) -> Result<RecoveryReport> {
    let companions = CompanionFiles::for_file(path)?;
    reporter.report_repair_start(path, damaged.len());

    let mut file = file_ops::open_read_write(path)?;
    let geometry = StripeGeometry::new(file.metadata()?.len(), width);
    let mut parity = ParityReader::new(BufReader::new(file_ops::open_read(
        &companions.redundancy,
    )?));

    let report = recover(&mut file, damaged, &mut parity, &geometry)?;
    file.sync_all()?;

    reporter.report_unprotected(&report.unprotected);
    reporter.report_repair_complete(path, &report);
    Ok(report)
}

/// Copy `path` to its `.damaged` sibling and corrupt the copy
pub fn simulate_damage<D: DamageSource + ?Sized>(
    path: &Path,
    config: &DamageConfig,
    source: &mut D,
) -> Result<(PathBuf, Vec<DamageEvent>)> {
    let damaged_path = file_ops::copy_for_damage(path)?;
    let mut file = file_ops::open_read_write(&damaged_path)?;
    let events = inject_damage(&mut file, config, source)?;
    file.sync_all()?;
    info!(
        "wrote {} damage bursts into {}",
        events.len(),
        damaged_path.display()
    );
    Ok((damaged_path, events))
}

/// Results of a full protect / corrupt / detect / recover / detect cycle
#[derive(Debug, Clone)]
pub struct DemoSummary {
    pub protection: ProtectionSummary,
    pub damaged_path: PathBuf,
    pub events: Vec<DamageEvent>,
    pub detected_before: DamagedBlocks,
    pub recovery: RecoveryReport,
    pub detected_after: DamagedBlocks,
}

impl DemoSummary {
    pub fn is_fully_recovered(&self) -> bool {
        self.detected_after.is_empty()
    }
}

pub fn run_demo<R, D>(
    path: &Path,
    config: &ProtectionConfig,
    damage: &DamageConfig,
    source: &mut D,
    reporter: &R,
) -> Result<DemoSummary>
where
    R: PassReporter + ?Sized,
    D: DamageSource + ?Sized,
{
    reporter.report_progress("Creating parity data file and CRC data file...");
    let protection = protect_file(path, config, reporter)?;

    reporter.report_progress("Creating a randomly damaged copy of the file...");
    let (damaged_path, events) = simulate_damage(path, damage, source)?;

    reporter.report_progress("Detecting which blocks in file are damaged...");
    let detected_before = verify_file(&damaged_path, reporter)?;

    reporter.report_progress("Recovering the file with parity data...");
    let recovery = repair_file(
        &damaged_path,
        detected_before.indices(),
        config.group_width,
        reporter,
    )?;

    reporter.report_progress("Detecting which blocks in file could not be recovered...");
    let detected_after = verify_file(&damaged_path, reporter)?;

    if detected_after.is_empty() {
        reporter.report_complete("All the damaged blocks were recovered.");
    } else {
        reporter.report_error(&format!(
            "Detected {} damaged blocks which could not be recovered.",
            detected_after.len()
        ));
    }

    Ok(DemoSummary {
        protection,
        damaged_path,
        events,
        detected_before,
        recovery,
        detected_after,
    })
}
