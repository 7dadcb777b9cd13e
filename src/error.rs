//! Error types for protection, detection and recovery passes

use crate::domain::StripeIndex;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a protection, detection or recovery pass
#[derive(Debug, Error)]
pub enum RaidError {
    /// Group width must be at least one virtual disk
    #[error("Invalid group width {0}: at least one virtual disk is required")]
    InvalidGroupWidth(usize),

    /// Companion file names are derived by replacing the extension
    #[error("Cannot derive companion file names for {0}: it has no extension")]
    NoExtension(PathBuf),

    /// Derived companion path is the input file itself
    #[error("Companion file for {0} would overwrite the file itself")]
    CompanionCollision(PathBuf),

    /// Redundancy artifact ends before the parity block of a stripe
    #[error("Redundancy file has no parity block for stripe {stripe}")]
    MissingParity { stripe: StripeIndex },

    /// Failed to open file for reading
    #[error("Failed to open file: {file}: {source}")]
    FileOpenError {
        file: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create output file
    #[error("Failed to create output file: {file}: {source}")]
    FileCreateError {
        file: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a block
    #[error("Failed to read block at offset {offset}: {source}")]
    BlockReadError { offset: u64, source: std::io::Error },

    /// Failed to write a block
    #[error("Failed to write block at offset {offset}: {source}")]
    BlockWriteError { offset: u64, source: std::io::Error },

    /// I/O error occurred (catch-all for other I/O errors)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with RaidError
pub type Result<T> = std::result::Result<T, RaidError>;
