//! Block-level damage detection against a stored checksum artifact

use crate::block_io::read_up_to;
use crate::checksum::{digest, digests_equal, ChecksumArtifact};
use crate::domain::{BlockIndex, BLOCK_SIZE};
use crate::error::Result;
use log::{debug, warn};
use std::io::Read;

/// Indices of blocks whose digest no longer matches, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamagedBlocks {
    indices: Vec<BlockIndex>,
    /// Blocks compared (the shorter of file blocks and stored digests)
    blocks_checked: u64,
}

impl DamagedBlocks {
    pub fn new(indices: Vec<BlockIndex>, blocks_checked: u64) -> Self {
        Self {
            indices,
            blocks_checked,
        }
    }

    pub fn indices(&self) -> &[BlockIndex] {
        &self.indices
    }

    pub fn blocks_checked(&self) -> u64 {
        self.blocks_checked
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn into_indices(self) -> Vec<BlockIndex> {
        self.indices
    }
}

/// Compare every block of `file` against `checksums` by position.
///
/// Comparison stops at whichever runs out first, the file or the stored
/// digests. A length mismatch is logged but never reported as damage.
pub fn detect<R: Read>(file: &mut R, checksums: &ChecksumArtifact) -> Result<DamagedBlocks> {
    let mut indices = Vec::new();
    let mut buffer = [0u8; BLOCK_SIZE];
    let mut block = 0u64;

    while let Some(expected) = checksums.get(block as usize) {
        let read = read_up_to(file, &mut buffer)?;
        if read == 0 {
            break;
        }
        if !digests_equal(digest(&buffer[..read]), expected) {
            debug!("block {} digest mismatch", block);
            indices.push(BlockIndex::new(block));
        }
        block += 1;
        if read < BLOCK_SIZE {
            break;
        }
    }

    if (block as usize) < checksums.len() {
        warn!(
            "file ended after {} blocks but {} digests are stored",
            block,
            checksums.len()
        );
    } else if read_up_to(file, &mut buffer[..1])? > 0 {
        warn!(
            "file has more blocks than the {} stored digests; the rest were not checked",
            checksums.len()
        );
    }

    Ok(DamagedBlocks::new(indices, block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn data(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_unmodified_file_is_clean() {
        let original = data(5 * BLOCK_SIZE + 17);
        let checksums = ChecksumArtifact::compute(&mut Cursor::new(&original)).unwrap();
        let damaged = detect(&mut Cursor::new(&original), &checksums).unwrap();
        assert!(damaged.is_empty());
        assert_eq!(damaged.blocks_checked(), 6);
    }

    #[test]
    fn test_flags_each_modified_block_once() {
        let original = data(6 * BLOCK_SIZE);
        let checksums = ChecksumArtifact::compute(&mut Cursor::new(&original)).unwrap();

        let mut corrupted = original.clone();
        corrupted[BLOCK_SIZE + 3] ^= 0xFF;
        corrupted[BLOCK_SIZE + 900] ^= 0xFF;
        corrupted[4 * BLOCK_SIZE] ^= 0x01;

        let damaged = detect(&mut Cursor::new(&corrupted), &checksums).unwrap();
        assert_eq!(
            damaged.indices(),
            &[BlockIndex::new(1), BlockIndex::new(4)]
        );
    }

    #[test]
    fn test_length_mismatch_truncates_comparison() {
        let original = data(4 * BLOCK_SIZE);
        let checksums = ChecksumArtifact::compute(&mut Cursor::new(&original)).unwrap();

        // Longer file: extra block is never compared
        let mut longer = original.clone();
        longer.extend_from_slice(&[0xEE; BLOCK_SIZE]);
        let damaged = detect(&mut Cursor::new(&longer), &checksums).unwrap();
        assert!(damaged.is_empty());
        assert_eq!(damaged.blocks_checked(), 4);

        // Shorter file: missing blocks are not flagged
        let shorter = &original[..2 * BLOCK_SIZE];
        let damaged = detect(&mut Cursor::new(shorter), &checksums).unwrap();
        assert!(damaged.is_empty());
        assert_eq!(damaged.blocks_checked(), 2);
    }
}
