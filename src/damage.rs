//! Synthetic damage injection for exercising detection and recovery
//!
//! Randomness comes from a [`DamageSource`] so a corruption scenario can be
//! replayed exactly from a seed, or scripted outright in tests.

use crate::block_io::stream_len;
use crate::config::DamageConfig;
use crate::domain::{BlockIndex, BLOCK_SIZE};
use crate::error::{RaidError, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::io::{Seek, SeekFrom, Write};

/// Where the next burst lands and what it writes
pub trait DamageSource {
    /// A position in `[0, 1)`, scaled by the file length
    fn next_fraction(&mut self) -> f64;

    /// Bytes to overwrite the file with
    fn fill_bytes(&mut self, buf: &mut [u8]);
}

/// [`DamageSource`] backed by a standard RNG
pub struct RandomDamage {
    rng: StdRng,
}

impl RandomDamage {
    /// Reproducible damage from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fresh damage on every run
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn from_config(config: &DamageConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os_rng(),
        }
    }
}

impl DamageSource for RandomDamage {
    fn next_fraction(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn fill_bytes(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }
}

/// One overwritten byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEvent {
    pub offset: u64,
    pub len: usize,
}

impl DamageEvent {
    /// Blocks touched by this event
    pub fn blocks(&self) -> impl Iterator<Item = BlockIndex> {
        let first = self.offset / BLOCK_SIZE as u64;
        let last = (self.offset + self.len.max(1) as u64 - 1) / BLOCK_SIZE as u64;
        (first..=last).map(BlockIndex::new)
    }
}

/// Overwrite `config.damages` random bursts of `config.burst_len` bytes.
///
/// Bursts are clipped at end of file so the file length never changes. A
/// burst of random bytes can, rarely, leave a block unchanged.
pub fn inject_damage<W, D>(
    file: &mut W,
    config: &DamageConfig,
    source: &mut D,
) -> Result<Vec<DamageEvent>>
where
    W: Write + Seek,
    D: DamageSource + ?Sized,
{
    let file_len = stream_len(file)?;
    let mut events = Vec::with_capacity(config.damages);
    if file_len == 0 {
        return Ok(events);
    }

    let mut burst = vec![0u8; config.burst_len];
    for _ in 0..config.damages {
        let offset = ((file_len as f64 * source.next_fraction()) as u64).min(file_len - 1);
        let len = (config.burst_len as u64).min(file_len - offset) as usize;
        source.fill_bytes(&mut burst[..len]);

        file.seek(SeekFrom::Start(offset))
            .map_err(|e| RaidError::BlockWriteError { offset, source: e })?;
        file.write_all(&burst[..len])
            .map_err(|e| RaidError::BlockWriteError { offset, source: e })?;
        debug!("damaged {} bytes at offset {}", len, offset);
        events.push(DamageEvent { offset, len });
    }

    file.flush()?;
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_seeded_damage_is_reproducible() {
        let config = DamageConfig::new(5, 100, Some(42));
        let mut first = Cursor::new(vec![0u8; 8 * BLOCK_SIZE]);
        let mut second = Cursor::new(vec![0u8; 8 * BLOCK_SIZE]);

        let a = inject_damage(&mut first, &config, &mut RandomDamage::seeded(42)).unwrap();
        let b = inject_damage(&mut second, &config, &mut RandomDamage::seeded(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(first.into_inner(), second.into_inner());
    }

    #[test]
    fn test_damage_never_grows_file() {
        struct AtEnd;
        impl DamageSource for AtEnd {
            fn next_fraction(&mut self) -> f64 {
                0.9999
            }
            fn fill_bytes(&mut self, buf: &mut [u8]) {
                buf.fill(0xFF);
            }
        }

        let mut file = Cursor::new(vec![0u8; 1000]);
        let events = inject_damage(&mut file, &DamageConfig::new(1, 100, None), &mut AtEnd).unwrap();
        assert_eq!(events[0].offset, 999);
        assert_eq!(events[0].len, 1);
        assert_eq!(file.get_ref().len(), 1000);
    }

    #[test]
    fn test_event_blocks_span_boundary() {
        let event = DamageEvent {
            offset: BLOCK_SIZE as u64 - 10,
            len: 100,
        };
        let blocks: Vec<u64> = event.blocks().map(|b| b.as_u64()).collect();
        assert_eq!(blocks, vec![0, 1]);
    }
}
