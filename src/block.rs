//! Fixed-size block and the XOR combination primitive
//!
//! Parity is plain XOR, so combining is commutative and associative: the
//! order in which stripe members are folded in never changes the result.
//! Recovery depends on that.

use crate::domain::BLOCK_SIZE;

const WORDS: usize = BLOCK_SIZE / 8;

/// One BLOCK_SIZE buffer, aligned so it can be XORed a word at a time
#[derive(Clone, PartialEq, Eq)]
#[repr(C, align(8))]
pub struct Block([u8; BLOCK_SIZE]);

impl Block {
    pub fn zeroed() -> Self {
        Block([0u8; BLOCK_SIZE])
    }

    /// Build a block from up to BLOCK_SIZE bytes, zero-extending short input
    pub fn from_prefix(data: &[u8]) -> Self {
        let mut block = Block::zeroed();
        let len = data.len().min(BLOCK_SIZE);
        block.0[..len].copy_from_slice(&data[..len]);
        block
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; BLOCK_SIZE] {
        &mut self.0
    }

    pub fn is_zero(&self) -> bool {
        self.words().iter().all(|&w| w == 0)
    }

    /// `self ^= other` for the whole block
    #[inline]
    pub fn xor_assign(&mut self, other: &Block) {
        let rhs = other.words();
        for (l, r) in self.words_mut().iter_mut().zip(rhs) {
            *l ^= *r;
        }
    }

    #[inline]
    fn words(&self) -> &[u64; WORDS] {
        // align(8) on Block makes the cast infallible
        bytemuck::cast_ref(&self.0)
    }

    #[inline]
    fn words_mut(&mut self) -> &mut [u64; WORDS] {
        bytemuck::cast_mut(&mut self.0)
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::zeroed()
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block({:02x?}..)", &self.0[..8])
    }
}

/// XOR of all input blocks; the zero block for an empty input
pub fn combine<'a, I>(blocks: I) -> Block
where
    I: IntoIterator<Item = &'a Block>,
{
    blocks.into_iter().fold(Block::zeroed(), |mut acc, block| {
        acc.xor_assign(block);
        acc
    })
}
