//! Configuration for protection and damage simulation passes

use crate::domain::GroupWidth;
use crate::error::Result;

/// Default number of bytes overwritten by each simulated damage burst
pub const DEFAULT_BURST_LEN: usize = 100;

/// Configuration for protect and repair passes
#[derive(Debug, Clone)]
pub struct ProtectionConfig {
    /// Number of virtual disks the file is split into
    pub group_width: GroupWidth,
    /// Number of threads for parity computation (0 = auto-detect)
    pub threads: usize,
    /// Whether to compute parity in parallel (false = single-threaded everything)
    pub parallel: bool,
}

impl ProtectionConfig {
    pub fn new(group_width: GroupWidth, threads: usize, parallel: bool) -> Self {
        Self {
            group_width,
            threads,
            parallel,
        }
    }

    /// Parallel, auto-detected thread count
    pub fn with_width(group_width: GroupWidth) -> Self {
        Self::new(group_width, 0, true)
    }

    pub fn from_args(matches: &clap::ArgMatches) -> Result<Self> {
        let width = matches.get_one::<usize>("width").copied().unwrap_or(1);
        let threads = matches.get_one::<usize>("threads").copied().unwrap_or(0);
        let parallel = !matches.get_flag("no-parallel");

        Ok(Self::new(GroupWidth::new(width)?, threads, parallel))
    }

    /// Get effective thread count (auto-detect if 0)
    pub fn effective_threads(&self) -> usize {
        match (self.parallel, self.threads) {
            (false, _) => 1, // Sequential mode always uses single thread
            (true, 0) => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            (true, n) => n,
        }
    }
}

/// Configuration for synthetic damage injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageConfig {
    /// Number of bursts to write
    pub damages: usize,
    /// Bytes per burst
    pub burst_len: usize,
    /// Seed for reproducible damage (None = fresh entropy)
    pub seed: Option<u64>,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            damages: 1,
            burst_len: DEFAULT_BURST_LEN,
            seed: None,
        }
    }
}

impl DamageConfig {
    pub fn new(damages: usize, burst_len: usize, seed: Option<u64>) -> Self {
        Self {
            damages,
            burst_len,
            seed,
        }
    }

    pub fn from_args(matches: &clap::ArgMatches) -> Self {
        let damages = matches.get_one::<usize>("damages").copied().unwrap_or(1);
        let burst_len = matches
            .get_one::<usize>("burst")
            .copied()
            .unwrap_or(DEFAULT_BURST_LEN);
        let seed = matches.get_one::<u64>("seed").copied();

        Self::new(damages, burst_len, seed)
    }
}
