//! Parity generation
//!
//! One parity block per stripe: the XOR of the block at that stripe on every
//! virtual disk, with reads past end of file counting as zero blocks. Stripes
//! are independent, so they can be computed in any order or in parallel; the
//! artifact is always written in stripe order.

use crate::block::Block;
use crate::block_io::{read_block_at, read_up_to};
use crate::domain::{StripeIndex, BLOCK_SIZE};
use crate::error::{RaidError, Result};
use crate::geometry::StripeGeometry;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Stripes computed per parallel batch before they are written out
const STRIPE_BATCH: usize = 512;

/// Parity blocks of a protected file, in stripe order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedundancyArtifact {
    blocks: Vec<Block>,
}

impl RedundancyArtifact {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Decode an artifact; a trailing partial block is ignored
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut blocks = Vec::new();
        let mut buffer = [0u8; BLOCK_SIZE];
        loop {
            let read = read_up_to(reader, &mut buffer)?;
            if read < BLOCK_SIZE {
                if read > 0 {
                    warn!("ignoring {} trailing bytes of a partial parity block", read);
                }
                break;
            }
            blocks.push(Block::from_prefix(&buffer));
        }
        Ok(Self { blocks })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for block in &self.blocks {
            writer.write_all(block.as_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn parity(&self, stripe: StripeIndex) -> Option<&Block> {
        self.blocks.get(stripe.as_u64() as usize)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Source of stored parity blocks for recovery
pub trait ParitySource {
    /// Stored parity block of `stripe`
    fn parity_block(&mut self, stripe: StripeIndex) -> Result<Block>;
}

impl ParitySource for RedundancyArtifact {
    fn parity_block(&mut self, stripe: StripeIndex) -> Result<Block> {
        self.parity(stripe)
            .cloned()
            .ok_or(RaidError::MissingParity { stripe })
    }
}

/// Reads parity blocks on demand from a redundancy file
pub struct ParityReader<R> {
    reader: R,
}

impl<R: Read + Seek> ParityReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> ParitySource for ParityReader<R> {
    fn parity_block(&mut self, stripe: StripeIndex) -> Result<Block> {
        let offset = stripe.parity_offset();
        let mut block = Block::zeroed();
        self.reader
            .seek(SeekFrom::Start(offset))
            .map_err(|source| RaidError::BlockReadError { offset, source })?;
        let read = read_up_to(&mut self.reader, block.as_bytes_mut())
            .map_err(|source| RaidError::BlockReadError { offset, source })?;
        if read < BLOCK_SIZE {
            return Err(RaidError::MissingParity { stripe });
        }
        Ok(block)
    }
}

/// Compute the parity block of one stripe from the current file content
pub fn stripe_parity<R: Read + Seek>(
    source: &mut R,
    geometry: &StripeGeometry,
    stripe: StripeIndex,
) -> Result<Block> {
    let mut parity = Block::zeroed();
    for member in geometry.stripe_members(stripe) {
        let block = read_block_at(source, member.byte_offset(), geometry.file_len())?;
        parity.xor_assign(&block);
    }
    Ok(parity)
}

/// Compute the full redundancy artifact in memory
pub fn generate<R: Read + Seek>(
    source: &mut R,
    geometry: &StripeGeometry,
) -> Result<RedundancyArtifact> {
    let blocks = geometry
        .stripes()
        .map(|stripe| stripe_parity(source, geometry, stripe))
        .collect::<Result<Vec<_>>>()?;
    Ok(RedundancyArtifact::new(blocks))
}

/// Stream parity blocks to `out` one stripe at a time.
///
/// Returns the number of parity blocks written.
pub fn write_parity<R: Read + Seek, W: Write>(
    source: &mut R,
    geometry: &StripeGeometry,
    out: &mut W,
) -> Result<u64> {
    let mut written = 0u64;
    for stripe in geometry.stripes() {
        let parity = stripe_parity(source, geometry, stripe)?;
        out.write_all(parity.as_bytes())?;
        written += 1;
    }
    out.flush()?;
    debug!("wrote {} parity blocks sequentially", written);
    Ok(written)
}

/// Compute parity on the current rayon pool and stream it to `out`.
///
/// Each worker opens its own read handle on `path`, so no seek position is
/// shared between threads. Output is identical to [`write_parity`].
pub fn write_parity_parallel<W: Write>(
    path: &Path,
    geometry: &StripeGeometry,
    out: &mut W,
) -> Result<u64> {
    let stripe_count = geometry.stripe_count() as usize;
    let mut written = 0u64;
    let mut start = 0usize;

    while start < stripe_count {
        let end = (start + STRIPE_BATCH).min(stripe_count);
        let batch: Vec<Block> = (start..end)
            .into_par_iter()
            .map_init(
                || File::open(path),
                |handle, s| {
                    let file = handle.as_mut().map_err(|e| RaidError::FileOpenError {
                        file: path.to_path_buf(),
                        source: std::io::Error::new(e.kind(), e.to_string()),
                    })?;
                    stripe_parity(file, geometry, StripeIndex::new(s as u64))
                },
            )
            .collect::<Result<Vec<_>>>()?;

        for parity in &batch {
            out.write_all(parity.as_bytes())?;
        }
        written += batch.len() as u64;
        start = end;
    }

    out.flush()?;
    info!(
        "wrote {} parity blocks for {} ({} disks)",
        written,
        path.display(),
        geometry.width()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::combine;
    use crate::domain::GroupWidth;
    use std::io::Cursor;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + i / 1024) as u8).collect()
    }

    #[test]
    fn test_parity_count_matches_stripes() {
        let data = sample(16 * BLOCK_SIZE);
        let geometry = StripeGeometry::new(data.len() as u64, GroupWidth::new(4).unwrap());
        let artifact = generate(&mut Cursor::new(&data), &geometry).unwrap();
        assert_eq!(artifact.len(), 4);
    }

    #[test]
    fn test_parity_is_xor_of_members() {
        let data = sample(16 * BLOCK_SIZE);
        let geometry = StripeGeometry::new(data.len() as u64, GroupWidth::new(4).unwrap());
        let artifact = generate(&mut Cursor::new(&data), &geometry).unwrap();

        let members: Vec<Block> = [1usize, 5, 9, 13]
            .iter()
            .map(|&g| Block::from_prefix(&data[g * BLOCK_SIZE..(g + 1) * BLOCK_SIZE]))
            .collect();
        assert_eq!(artifact.parity(StripeIndex::new(1)), Some(&combine(&members)));
    }

    #[test]
    fn test_streamed_matches_in_memory() {
        let data = sample(11 * BLOCK_SIZE + 300);
        let geometry = StripeGeometry::new(data.len() as u64, GroupWidth::new(3).unwrap());
        let artifact = generate(&mut Cursor::new(&data), &geometry).unwrap();

        let mut streamed = Vec::new();
        write_parity(&mut Cursor::new(&data), &geometry, &mut streamed).unwrap();

        let mut encoded = Vec::new();
        artifact.write_to(&mut encoded).unwrap();
        assert_eq!(streamed, encoded);
        assert_eq!(streamed.len() as u64, geometry.parity_len());
    }

    #[test]
    fn test_parity_reader_rejects_short_artifact() {
        let mut reader = ParityReader::new(Cursor::new(vec![0u8; BLOCK_SIZE + 10]));
        assert!(reader.parity_block(StripeIndex::new(0)).is_ok());
        assert!(matches!(
            reader.parity_block(StripeIndex::new(1)),
            Err(RaidError::MissingParity { .. })
        ));
    }

    #[test]
    fn test_decoded_artifact_drops_partial_block() {
        let mut artifact =
            RedundancyArtifact::read_from(&mut Cursor::new(vec![0xAAu8; BLOCK_SIZE + 10])).unwrap();
        assert_eq!(artifact.len(), 1);
        assert!(artifact.parity_block(StripeIndex::new(0)).is_ok());
        assert!(matches!(
            artifact.parity_block(StripeIndex::new(1)),
            Err(RaidError::MissingParity { .. })
        ));
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let data = sample(8 * BLOCK_SIZE);
        let geometry = StripeGeometry::new(data.len() as u64, GroupWidth::new(2).unwrap());
        let artifact = generate(&mut Cursor::new(&data), &geometry).unwrap();

        let mut encoded = Vec::new();
        artifact.write_to(&mut encoded).unwrap();
        let decoded = RedundancyArtifact::read_from(&mut Cursor::new(encoded)).unwrap();
        assert_eq!(decoded, artifact);
    }
}
