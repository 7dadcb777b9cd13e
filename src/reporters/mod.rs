//! Progress and output reporting for protection passes
//!
//! This module provides traits and implementations for reporting progress and results
//! across the protect, verify and repair passes. It keeps the core logic
//! decoupled from output formatting.

mod console;
mod silent;

pub use console::ConsoleReporter;
pub use silent::SilentReporter;

use crate::detect::DamagedBlocks;
use crate::domain::BlockIndex;
use crate::geometry::StripeGeometry;
use crate::recovery::RecoveryReport;
use std::path::Path;

/// Base trait for all reporters
pub trait Reporter: Send + Sync {
    /// Report general progress with a message
    fn report_progress(&self, message: &str);

    /// Report an error that occurred during operation
    fn report_error(&self, error: &str);

    /// Report successful completion of an operation
    fn report_complete(&self, message: &str);
}

/// Reporting for the protection pass
pub trait ProtectReporter: Reporter {
    /// Report the layout chosen for the file
    fn report_protect_start(&self, file: &Path, geometry: &StripeGeometry);

    /// Report an artifact written to disk
    fn report_artifact_written(&self, artifact: &Path, bytes: u64);
}

/// Reporting for detection passes
pub trait VerifyReporter: Reporter {
    /// Report verifying a specific file
    fn report_verifying_file(&self, file: &Path);

    /// Report the damaged blocks found in a file
    fn report_damaged_blocks(&self, file: &Path, damaged: &DamagedBlocks);
}

/// Reporting for recovery passes
pub trait RepairReporter: Reporter {
    /// Report starting repair of `count` blocks
    fn report_repair_start(&self, file: &Path, count: usize);

    /// Report blocks that could not be rebuilt because parity does not cover them
    fn report_unprotected(&self, blocks: &[BlockIndex]);

    /// Report final recovery results
    fn report_repair_complete(&self, file: &Path, report: &RecoveryReport);
}

/// Reporter usable for every pass
pub trait PassReporter: ProtectReporter + VerifyReporter + RepairReporter {}

impl<T: ProtectReporter + VerifyReporter + RepairReporter> PassReporter for T {}
