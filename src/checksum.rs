//! Per-block CRC32 digests and the checksum artifact
//!
//! The checksum artifact is a bare concatenation of 4-byte big-endian CRC32
//! values, one per BLOCK_SIZE block of the protected file in order. A short
//! final block is digested over the bytes actually present. Block size and
//! digest algorithm are not recorded; both sides must agree out of band.

use crate::block_io::read_up_to;
use crate::domain::{Digest, BLOCK_SIZE, DIGEST_SIZE};
use crate::error::Result;
use log::debug;
use std::io::{Read, Write};

/// Compute the CRC32 digest of a block (or a short final block)
///
/// Uses the IEEE polynomial (same as Ethernet and PKZIP)
#[inline]
pub fn digest(data: &[u8]) -> Digest {
    Digest::new(crc32fast::hash(data))
}

/// Exact digest comparison, no tolerance
#[inline]
pub fn digests_equal(a: Digest, b: Digest) -> bool {
    a == b
}

/// Ordered per-block digests of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumArtifact {
    digests: Vec<Digest>,
}

impl ChecksumArtifact {
    pub fn new(digests: Vec<Digest>) -> Self {
        Self { digests }
    }

    /// Digest every block of `reader` from its current position to EOF
    pub fn compute<R: Read>(reader: &mut R) -> Result<Self> {
        let mut digests = Vec::new();
        let mut buffer = [0u8; BLOCK_SIZE];
        loop {
            let read = read_up_to(reader, &mut buffer)?;
            if read == 0 {
                break;
            }
            digests.push(digest(&buffer[..read]));
            if read < BLOCK_SIZE {
                break;
            }
        }
        debug!("computed {} block digests", digests.len());
        Ok(Self { digests })
    }

    /// Decode an artifact; a trailing partial digest is ignored
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let digests = bytes
            .chunks_exact(DIGEST_SIZE)
            .map(|chunk| Digest::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Self { digests })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for digest in &self.digests {
            writer.write_all(&digest.to_be_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn digests(&self) -> &[Digest] {
        &self.digests
    }

    pub fn get(&self, index: usize) -> Option<Digest> {
        self.digests.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Encoded size in bytes
    pub fn byte_len(&self) -> u64 {
        (self.digests.len() * DIGEST_SIZE) as u64
    }
}

/// Stream `source` block by block and write its checksum artifact to `out`.
///
/// Returns the number of digests written.
pub fn create_checksums<R: Read, W: Write>(source: &mut R, out: &mut W) -> Result<usize> {
    let artifact = ChecksumArtifact::compute(source)?;
    artifact.write_to(out)?;
    Ok(artifact.len())
}

/// Decode a checksum artifact previously written by [`create_checksums`]
pub fn read_checksums<R: Read>(reader: &mut R) -> Result<ChecksumArtifact> {
    ChecksumArtifact::read_from(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_digest_matches_reference_crc32() {
        // Standard CRC-32/IEEE check value
        assert_eq!(digest(b"123456789"), 0xCBF4_3926u32);
    }

    #[test]
    fn test_compute_counts_short_final_block() {
        let data = vec![7u8; BLOCK_SIZE * 2 + 10];
        let artifact = ChecksumArtifact::compute(&mut Cursor::new(&data)).unwrap();
        assert_eq!(artifact.len(), 3);
        assert_eq!(artifact.get(2), Some(digest(&data[2 * BLOCK_SIZE..])));
    }

    #[test]
    fn test_empty_input_has_no_digests() {
        let artifact = ChecksumArtifact::compute(&mut Cursor::new(Vec::new())).unwrap();
        assert!(artifact.is_empty());
        assert_eq!(artifact.byte_len(), 0);
    }

    #[test]
    fn test_artifact_encoding_is_big_endian() {
        let artifact = ChecksumArtifact::new(vec![Digest::new(0xDEAD_BEEF)]);
        let mut out = Vec::new();
        artifact.write_to(&mut out).unwrap();
        assert_eq!(out, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }
}
