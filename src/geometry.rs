//! Stripe geometry: how a file is laid out as virtual disks and stripes
//!
//! A file of `len` bytes protected with group width `w` is cut into `w`
//! contiguous virtual disks of `stripe_count` blocks each, where
//! `stripe_count = len / (BLOCK_SIZE * w)`. Stripe `s` is block `s` of every
//! disk. Blocks beyond `stripe_count * w` are left unprotected.
//!
//! Files smaller than one full group fall back to a single stripe: with
//! `stripe_count = 1` every block is its own disk, so the one parity block
//! covers the whole file.
//!
//! Parity generation and recovery must agree exactly on this mapping. All of
//! the index arithmetic lives here and nowhere else.

use crate::domain::{BlockIndex, DiskIndex, GroupWidth, StripeIndex, BLOCK_SIZE};

/// Coordinates of a protected block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockLocation {
    pub disk: DiskIndex,
    pub stripe: StripeIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripeGeometry {
    file_len: u64,
    width: GroupWidth,
    stripe_count: u64,
    degenerate: bool,
}

impl StripeGeometry {
    pub fn new(file_len: u64, width: GroupWidth) -> Self {
        let group_bytes = BLOCK_SIZE as u64 * width.get() as u64;
        let full_stripes = file_len / group_bytes;
        let degenerate = full_stripes == 0;
        Self {
            file_len,
            width,
            stripe_count: if degenerate { 1 } else { full_stripes },
            degenerate,
        }
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    pub fn width(&self) -> GroupWidth {
        self.width
    }

    /// Number of stripes, and so of parity blocks in the redundancy artifact
    pub fn stripe_count(&self) -> u64 {
        self.stripe_count
    }

    /// True when the file is smaller than one full group
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Blocks of the file, counting a short final block
    pub fn file_blocks(&self) -> u64 {
        self.file_len.div_ceil(BLOCK_SIZE as u64)
    }

    /// Number of leading global blocks covered by parity
    pub fn protected_blocks(&self) -> u64 {
        self.stripe_count * self.width.get() as u64
    }

    /// Size in bytes of the redundancy artifact
    pub fn parity_len(&self) -> u64 {
        self.stripe_count * BLOCK_SIZE as u64
    }

    /// Decompose a global block index into (disk, stripe).
    ///
    /// Returns `None` for blocks past the protected range.
    pub fn locate(&self, block: BlockIndex) -> Option<BlockLocation> {
        let g = block.as_u64();
        if g >= self.protected_blocks() {
            return None;
        }
        Some(BlockLocation {
            disk: DiskIndex::new((g / self.stripe_count) as usize),
            stripe: StripeIndex::new(g % self.stripe_count),
        })
    }

    /// Global block index of `disk`'s block in `stripe`
    pub fn global_index(&self, disk: DiskIndex, stripe: StripeIndex) -> BlockIndex {
        BlockIndex::new(disk.as_usize() as u64 * self.stripe_count + stripe.as_u64())
    }

    /// Byte offset in the protected file of `disk`'s block in `stripe`
    pub fn block_offset(&self, disk: DiskIndex, stripe: StripeIndex) -> u64 {
        self.global_index(disk, stripe).byte_offset()
    }

    /// Global indices of every member of `stripe`, in disk order
    pub fn stripe_members(&self, stripe: StripeIndex) -> impl Iterator<Item = BlockIndex> + '_ {
        (0..self.width.get()).map(move |d| self.global_index(DiskIndex::new(d), stripe))
    }

    pub fn stripes(&self) -> impl Iterator<Item = StripeIndex> {
        (0..self.stripe_count).map(StripeIndex::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(w: usize) -> GroupWidth {
        GroupWidth::new(w).unwrap()
    }

    #[test]
    fn test_sixteen_blocks_four_disks() {
        let geometry = StripeGeometry::new(16 * BLOCK_SIZE as u64, width(4));
        assert_eq!(geometry.stripe_count(), 4);
        assert!(!geometry.is_degenerate());

        let location = geometry.locate(BlockIndex::new(9)).unwrap();
        assert_eq!(location.disk, DiskIndex::new(2));
        assert_eq!(location.stripe, StripeIndex::new(1));

        let members: Vec<u64> = geometry
            .stripe_members(location.stripe)
            .map(|b| b.as_u64())
            .collect();
        assert_eq!(members, vec![1, 5, 9, 13]);
    }

    #[test]
    fn test_tail_blocks_are_unprotected() {
        // 10 blocks, width 4 -> 2 stripes, blocks 8 and 9 uncovered
        let geometry = StripeGeometry::new(10 * BLOCK_SIZE as u64, width(4));
        assert_eq!(geometry.stripe_count(), 2);
        assert_eq!(geometry.protected_blocks(), 8);
        assert!(geometry.locate(BlockIndex::new(7)).is_some());
        assert!(geometry.locate(BlockIndex::new(8)).is_none());
    }

    #[test]
    fn test_small_file_falls_back_to_single_stripe() {
        let geometry = StripeGeometry::new(2500, width(4));
        assert!(geometry.is_degenerate());
        assert_eq!(geometry.stripe_count(), 1);
        assert_eq!(geometry.file_blocks(), 3);

        for g in 0..3 {
            let location = geometry.locate(BlockIndex::new(g)).unwrap();
            assert_eq!(location.stripe, StripeIndex::new(0));
            assert_eq!(location.disk, DiskIndex::new(g as usize));
        }
    }

    #[test]
    fn test_empty_file_geometry() {
        let geometry = StripeGeometry::new(0, width(3));
        assert!(geometry.is_degenerate());
        assert_eq!(geometry.file_blocks(), 0);
        assert_eq!(geometry.parity_len(), BLOCK_SIZE as u64);
    }

    #[test]
    fn test_block_offset() {
        let geometry = StripeGeometry::new(16 * BLOCK_SIZE as u64, width(4));
        assert_eq!(
            geometry.block_offset(DiskIndex::new(3), StripeIndex::new(2)),
            (3 * 4 + 2) * BLOCK_SIZE as u64
        );
    }
}
