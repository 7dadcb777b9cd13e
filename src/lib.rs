pub mod args;
pub mod block;
pub mod block_io;
pub mod checksum;
pub mod config;
pub mod damage;
pub mod detect;
pub mod domain;
pub mod error;
pub mod file_ops;
pub mod geometry;
pub mod parity;
pub mod recovery;
pub mod reporters;
pub mod workflow;

pub use block::{combine, Block};
pub use checksum::{create_checksums, digest, digests_equal, read_checksums, ChecksumArtifact};
pub use config::{DamageConfig, ProtectionConfig};
pub use detect::{detect, DamagedBlocks};
pub use domain::{BlockIndex, Digest, DiskIndex, GroupWidth, StripeIndex, BLOCK_SIZE, DIGEST_SIZE};
pub use error::{RaidError, Result};
pub use geometry::{BlockLocation, StripeGeometry};
pub use parity::{generate, ParityReader, ParitySource, RedundancyArtifact};
pub use recovery::{recover, RecoveryReport};
