//! Core domain types for parity protection
//!
//! Type-safe wrappers for the indices and values that flow between the
//! geometry, parity and recovery code. Block, stripe and disk indices are all
//! small integers; keeping them distinct makes it impossible to pass a stripe
//! where a global block index was expected.

use crate::error::{RaidError, Result};

/// Size in bytes of every block that is checksummed or XORed
pub const BLOCK_SIZE: usize = 1024;

/// Size in bytes of one stored digest in the checksum artifact
pub const DIGEST_SIZE: usize = 4;

/// Global block index, counted in BLOCK_SIZE units from the start of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockIndex(u64);

impl BlockIndex {
    pub fn new(index: u64) -> Self {
        BlockIndex(index)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Byte offset of the first byte of this block
    pub fn byte_offset(&self) -> u64 {
        self.0 * BLOCK_SIZE as u64
    }
}

impl From<u64> for BlockIndex {
    fn from(index: u64) -> Self {
        BlockIndex::new(index)
    }
}

impl std::fmt::Display for BlockIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stripe index, in `[0, stripe_count)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StripeIndex(u64);

impl StripeIndex {
    pub fn new(index: u64) -> Self {
        StripeIndex(index)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Byte offset of this stripe's parity block in the redundancy artifact
    pub fn parity_offset(&self) -> u64 {
        self.0 * BLOCK_SIZE as u64
    }
}

impl std::fmt::Display for StripeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Virtual disk index, in `[0, group_width)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiskIndex(usize);

impl DiskIndex {
    pub fn new(index: usize) -> Self {
        DiskIndex(index)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for DiskIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of virtual disks a file is split into (always at least 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupWidth(usize);

impl GroupWidth {
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(RaidError::InvalidGroupWidth(width));
        }
        Ok(GroupWidth(width))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for GroupWidth {
    type Error = RaidError;

    fn try_from(width: usize) -> Result<Self> {
        GroupWidth::new(width)
    }
}

impl std::fmt::Display for GroupWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-block CRC32 digest
/// Prevents mixing digests with counts or other u32 values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(u32);

impl Digest {
    pub fn new(value: u32) -> Self {
        Digest(value)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Encoding used in the checksum artifact
    pub fn to_be_bytes(&self) -> [u8; DIGEST_SIZE] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Digest(u32::from_be_bytes(bytes))
    }
}

impl From<u32> for Digest {
    fn from(value: u32) -> Self {
        Digest::new(value)
    }
}

impl PartialEq<u32> for Digest {
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_width_rejects_zero() {
        assert!(matches!(
            GroupWidth::new(0),
            Err(RaidError::InvalidGroupWidth(0))
        ));
        assert_eq!(GroupWidth::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_digest_big_endian_encoding() {
        let digest = Digest::new(0x0102_0304);
        assert_eq!(digest.to_be_bytes(), [1, 2, 3, 4]);
        assert_eq!(Digest::from_be_bytes([1, 2, 3, 4]), digest);
        assert_eq!(digest.to_string(), "01020304");
    }

    #[test]
    fn test_block_and_stripe_offsets() {
        assert_eq!(BlockIndex::new(9).byte_offset(), 9 * 1024);
        assert_eq!(StripeIndex::new(3).parity_offset(), 3 * 1024);
    }
}
