//! Console reporter for protection passes

use super::{ProtectReporter, RepairReporter, Reporter, VerifyReporter};
use crate::detect::DamagedBlocks;
use crate::domain::BlockIndex;
use crate::geometry::StripeGeometry;
use crate::recovery::RecoveryReport;
use std::path::Path;

/// Constants for output formatting
const MIN_BLOCKS_FOR_SUMMARY: usize = 20; // Show detailed block list if <= this many blocks
const BLOCK_SUMMARY_HEAD_TAIL: usize = 10; // Show first/last N blocks for large damaged lists

/// Console implementation for all passes
#[derive(Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Reporter for ConsoleReporter {
    fn report_progress(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    fn report_error(&self, error: &str) {
        eprintln!("Error: {}", error);
    }

    fn report_complete(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }
}

impl ProtectReporter for ConsoleReporter {
    fn report_protect_start(&self, file: &Path, geometry: &StripeGeometry) {
        if self.quiet {
            return;
        }
        println!("Protecting: \"{}\"", file.display());
        println!(
            "  {} bytes in {} blocks, {} disks of {} blocks",
            geometry.file_len(),
            geometry.file_blocks(),
            geometry.width(),
            geometry.stripe_count()
        );
        if geometry.is_degenerate() {
            println!("  File is smaller than one parity group; using a single stripe.");
        } else if geometry.protected_blocks() < geometry.file_blocks() {
            println!(
                "  The last {} blocks are not covered by parity.",
                geometry.file_blocks() - geometry.protected_blocks()
            );
        }
    }

    fn report_artifact_written(&self, artifact: &Path, bytes: u64) {
        if !self.quiet {
            println!("Wrote \"{}\" ({} bytes)", artifact.display(), bytes);
        }
    }
}

impl VerifyReporter for ConsoleReporter {
    fn report_verifying_file(&self, file: &Path) {
        if !self.quiet {
            println!("Verifying: \"{}\"", file.display());
        }
    }

    fn report_damaged_blocks(&self, file: &Path, damaged: &DamagedBlocks) {
        if self.quiet {
            return;
        }
        if damaged.is_empty() {
            println!("Target: \"{}\" - found.", file.display());
            return;
        }
        println!(
            "Target: \"{}\" - damaged. {} of {} blocks are damaged:",
            file.display(),
            damaged.len(),
            damaged.blocks_checked()
        );
        print_block_list(damaged.indices());
    }
}

impl RepairReporter for ConsoleReporter {
    fn report_repair_start(&self, file: &Path, count: usize) {
        if !self.quiet {
            println!("Repairing {} blocks in \"{}\"", count, file.display());
        }
    }

    fn report_unprotected(&self, blocks: &[BlockIndex]) {
        if self.quiet || blocks.is_empty() {
            return;
        }
        println!("{} blocks are not covered by parity:", blocks.len());
        print_block_list(blocks);
    }

    fn report_repair_complete(&self, file: &Path, report: &RecoveryReport) {
        if self.quiet {
            return;
        }
        println!(
            "Target: \"{}\" - {} blocks rebuilt from parity.",
            file.display(),
            report.repaired_count()
        );
        if report.has_shared_stripes() {
            println!(
                "  {} stripes had more than one damaged block and cannot be rebuilt correctly.",
                report.shared_stripes.len()
            );
        }
    }
}

/// Print a list of block numbers, with summary for large lists
fn print_block_list(blocks: &[BlockIndex]) {
    if blocks.len() <= MIN_BLOCKS_FOR_SUMMARY {
        for block in blocks {
            println!("  Block {}: damaged", block);
        }
    } else {
        for block in &blocks[..BLOCK_SUMMARY_HEAD_TAIL] {
            println!("  Block {}: damaged", block);
        }
        println!(
            "  ... {} more damaged blocks ...",
            blocks.len() - (2 * BLOCK_SUMMARY_HEAD_TAIL)
        );
        for block in &blocks[blocks.len() - BLOCK_SUMMARY_HEAD_TAIL..] {
            println!("  Block {}: damaged", block);
        }
    }
}
