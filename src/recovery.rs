//! In-place reconstruction of damaged blocks from stripe parity
//!
//! For a damaged block at (disk, stripe): read every member of the stripe as
//! it currently is, put the stored parity in the damaged member's slot and XOR
//! the lot. The intact members cancel against their contribution to the
//! parity, leaving the original content of the damaged block.
//!
//! Single parity can only absorb one bad member per stripe. If two damaged
//! blocks share a stripe, the second bad member is folded in as if it were
//! correct and the result is silently wrong. Such stripes are listed in the
//! report but are reconstructed the same way as any other.

use crate::block::{combine, Block};
use crate::block_io::{read_block_at, write_block_at};
use crate::domain::{BlockIndex, StripeIndex};
use crate::error::Result;
use crate::geometry::StripeGeometry;
use crate::parity::ParitySource;
use log::{debug, warn};
use rustc_hash::FxHashMap as HashMap;
use std::io::{Read, Seek, Write};

/// Outcome of one recovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Blocks rewritten from parity, in the order they were processed
    pub repaired: Vec<BlockIndex>,
    /// Blocks outside the protected range or past end of file
    pub unprotected: Vec<BlockIndex>,
    /// Stripes that held more than one of the requested blocks
    pub shared_stripes: Vec<StripeIndex>,
}

impl RecoveryReport {
    pub fn repaired_count(&self) -> usize {
        self.repaired.len()
    }

    pub fn has_shared_stripes(&self) -> bool {
        !self.shared_stripes.is_empty()
    }
}

/// Reconstruct a single block and write it back.
///
/// Returns the reconstructed block, or `None` if `block` is not covered by
/// `geometry` and was left untouched.
pub fn recover_block<F, P>(
    file: &mut F,
    parity: &mut P,
    geometry: &StripeGeometry,
    block: BlockIndex,
) -> Result<Option<Block>>
where
    F: Read + Write + Seek,
    P: ParitySource + ?Sized,
{
    let file_len = geometry.file_len();
    let location = match geometry.locate(block) {
        Some(location) if block.byte_offset() < file_len => location,
        _ => return Ok(None),
    };

    let mut working_set = geometry
        .stripe_members(location.stripe)
        .map(|member| read_block_at(file, member.byte_offset(), file_len))
        .collect::<Result<Vec<_>>>()?;
    working_set[location.disk.as_usize()] = parity.parity_block(location.stripe)?;

    let recovered = combine(&working_set);
    write_block_at(file, block.byte_offset(), file_len, &recovered)?;
    debug!(
        "block {} rebuilt from stripe {} (disk {})",
        block, location.stripe, location.disk
    );
    Ok(Some(recovered))
}

/// Reconstruct each of `damaged` in order, writing results into `file`.
///
/// `geometry` must describe the file as it is now; the path-level entry
/// points derive it from the current file length.
pub fn recover<F, P>(
    file: &mut F,
    damaged: &[BlockIndex],
    parity: &mut P,
    geometry: &StripeGeometry,
) -> Result<RecoveryReport>
where
    F: Read + Write + Seek,
    P: ParitySource + ?Sized,
{
    let mut report = RecoveryReport {
        shared_stripes: shared_stripes(damaged, geometry),
        ..Default::default()
    };
    for stripe in &report.shared_stripes {
        warn!(
            "stripe {} has more than one damaged block; its reconstruction will be wrong",
            stripe
        );
    }

    for &block in damaged {
        match recover_block(file, parity, geometry, block)? {
            Some(_) => report.repaired.push(block),
            None => {
                warn!("block {} is not covered by parity, skipping", block);
                report.unprotected.push(block);
            }
        }
    }

    file.flush()?;
    Ok(report)
}

/// Stripes that more than one of `damaged` maps to, in ascending order
pub fn shared_stripes(damaged: &[BlockIndex], geometry: &StripeGeometry) -> Vec<StripeIndex> {
    let mut counts: HashMap<StripeIndex, usize> = HashMap::default();
    for location in damaged.iter().filter_map(|&b| geometry.locate(b)) {
        *counts.entry(location.stripe).or_insert(0) += 1;
    }
    let mut shared: Vec<StripeIndex> = counts
        .into_iter()
        .filter_map(|(stripe, count)| (count > 1).then_some(stripe))
        .collect();
    shared.sort();
    shared
}
