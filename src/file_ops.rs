//! Companion file naming and file opening helpers
//!
//! The redundancy and checksum artifacts sit next to the protected file and
//! share its stem: `photo.jpg` is protected by `photo.raid` and
//! `photo.crc32`. A damaged working copy `photo.damaged` therefore maps to the
//! same companions as the original.

use crate::error::{RaidError, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub const RAID_EXTENSION: &str = "raid";
pub const CHECKSUM_EXTENSION: &str = "crc32";
pub const DAMAGED_EXTENSION: &str = "damaged";

/// Artifact paths belonging to one protected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionFiles {
    pub redundancy: PathBuf,
    pub checksums: PathBuf,
}

impl CompanionFiles {
    pub fn for_file(path: &Path) -> Result<Self> {
        Ok(Self {
            redundancy: replace_extension(path, RAID_EXTENSION)?,
            checksums: replace_extension(path, CHECKSUM_EXTENSION)?,
        })
    }

    pub fn exist(&self) -> bool {
        self.redundancy.exists() && self.checksums.exists()
    }
}

/// Swap the extension of `path`.
///
/// Paths without an extension are rejected, as are paths that already carry
/// `extension`: the companion would be the input file itself.
pub fn replace_extension(path: &Path, extension: &str) -> Result<PathBuf> {
    if path.extension().is_none() {
        return Err(RaidError::NoExtension(path.to_path_buf()));
    }
    let companion = path.with_extension(extension);
    if companion == path {
        return Err(RaidError::CompanionCollision(path.to_path_buf()));
    }
    Ok(companion)
}

/// Path of the scratch copy used for damage simulation
pub fn damaged_copy_path(path: &Path) -> Result<PathBuf> {
    replace_extension(path, DAMAGED_EXTENSION)
}

/// Copy `path` to its `.damaged` sibling, overwriting any previous copy
pub fn copy_for_damage(path: &Path) -> Result<PathBuf> {
    let target = damaged_copy_path(path)?;
    fs::copy(path, &target).map_err(|source| RaidError::FileCreateError {
        file: target.clone(),
        source,
    })?;
    Ok(target)
}

pub fn open_read(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| RaidError::FileOpenError {
        file: path.to_path_buf(),
        source,
    })
}

/// Open an existing file for in-place repair; never truncates
pub fn open_read_write(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|source| RaidError::FileOpenError {
            file: path.to_path_buf(),
            source,
        })
}

pub fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| RaidError::FileCreateError {
        file: path.to_path_buf(),
        source,
    })
}

pub fn file_len(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|source| RaidError::FileOpenError {
            file: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_companions_share_stem() {
        let companions = CompanionFiles::for_file(Path::new("/data/photo.jpg")).unwrap();
        assert_eq!(companions.redundancy, PathBuf::from("/data/photo.raid"));
        assert_eq!(companions.checksums, PathBuf::from("/data/photo.crc32"));
    }

    #[test]
    fn test_damaged_copy_maps_to_same_companions() {
        let damaged = damaged_copy_path(Path::new("archive.tar.gz")).unwrap();
        assert_eq!(damaged, PathBuf::from("archive.tar.damaged"));
        assert_eq!(
            CompanionFiles::for_file(&damaged).unwrap(),
            CompanionFiles::for_file(Path::new("archive.tar.gz")).unwrap()
        );
    }

    #[test]
    fn test_companion_extension_is_rejected() {
        for name in ["backup.raid", "sums.crc32"] {
            assert!(matches!(
                CompanionFiles::for_file(Path::new(name)),
                Err(RaidError::CompanionCollision(_))
            ));
        }
        assert!(matches!(
            damaged_copy_path(Path::new("notes.damaged")),
            Err(RaidError::CompanionCollision(_))
        ));
    }

    #[test]
    fn test_missing_extension_is_rejected() {
        assert!(matches!(
            CompanionFiles::for_file(Path::new("README")),
            Err(RaidError::NoExtension(_))
        ));
    }
}
