//! Positioned block reads and writes
//!
//! Reads past end of file are zero-filled rather than failing, because the
//! final block of a file is allowed to be short and virtual disks may run off
//! the end of the file. Writes are clamped to the current file length so that
//! repairing a block never grows or truncates the file.

use crate::block::Block;
use crate::domain::BLOCK_SIZE;
use crate::error::{RaidError, Result};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

/// Fill `buf` from `reader` until it is full or the reader is exhausted.
///
/// Returns the number of bytes read. A single `read` call may return less
/// than requested long before end of file, so this keeps reading.
pub fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read the block starting at `offset`, zero-filling anything at or past EOF
pub fn read_block_at<R: Read + Seek>(reader: &mut R, offset: u64, file_len: u64) -> Result<Block> {
    let mut block = Block::zeroed();
    if offset >= file_len {
        return Ok(block);
    }

    reader
        .seek(SeekFrom::Start(offset))
        .map_err(|source| RaidError::BlockReadError { offset, source })?;
    read_up_to(reader, block.as_bytes_mut())
        .map_err(|source| RaidError::BlockReadError { offset, source })?;
    Ok(block)
}

/// Write `block` at `offset`, dropping any bytes that would land past `file_len`.
///
/// Returns the number of bytes written.
pub fn write_block_at<W: Write + Seek>(
    writer: &mut W,
    offset: u64,
    file_len: u64,
    block: &Block,
) -> Result<usize> {
    if offset >= file_len {
        return Ok(0);
    }

    let len = (file_len - offset).min(BLOCK_SIZE as u64) as usize;
    writer
        .seek(SeekFrom::Start(offset))
        .map_err(|source| RaidError::BlockWriteError { offset, source })?;
    writer
        .write_all(&block.as_bytes()[..len])
        .map_err(|source| RaidError::BlockWriteError { offset, source })?;
    Ok(len)
}

/// Length of a seekable stream, restoring its position afterwards
pub fn stream_len<S: Seek>(stream: &mut S) -> Result<u64> {
    let position = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    if position != len {
        stream.seek(SeekFrom::Start(position))?;
    }
    Ok(len)
}
