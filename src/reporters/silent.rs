//! Silent reporter
//!
//! Provides a no-output implementation for testing or when quiet operation is desired.

use super::{ProtectReporter, RepairReporter, Reporter, VerifyReporter};
use crate::detect::DamagedBlocks;
use crate::domain::BlockIndex;
use crate::geometry::StripeGeometry;
use crate::recovery::RecoveryReport;
use std::path::Path;

#[derive(Default)]
pub struct SilentReporter;

impl SilentReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for SilentReporter {
    fn report_progress(&self, _message: &str) {}
    fn report_error(&self, _error: &str) {}
    fn report_complete(&self, _message: &str) {}
}

impl ProtectReporter for SilentReporter {
    fn report_protect_start(&self, _file: &Path, _geometry: &StripeGeometry) {}
    fn report_artifact_written(&self, _artifact: &Path, _bytes: u64) {}
}

impl VerifyReporter for SilentReporter {
    fn report_verifying_file(&self, _file: &Path) {}
    fn report_damaged_blocks(&self, _file: &Path, _damaged: &DamagedBlocks) {}
}

impl RepairReporter for SilentReporter {
    fn report_repair_start(&self, _file: &Path, _count: usize) {}
    fn report_unprotected(&self, _blocks: &[BlockIndex]) {}
    fn report_repair_complete(&self, _file: &Path, _report: &RecoveryReport) {}
}
