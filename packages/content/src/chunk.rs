//! Splitting files into chunks and combining chunks into files.
//!
//! A [`Chunk`] is a plain byte buffer. Its position in the sequence it
//! belongs to is what decides where it goes in the combined output; the
//! position is never transmitted.
//!
//! [`combine`] never leaves a truncated file at the output path. The chunks
//! are written to a temporary file next to the output, and the temporary file
//! is renamed onto the output path only after every chunk has been written
//! and flushed.
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use swarmshare_located_error::Located;

use crate::error::StorageError;

/// A bounded slice of a file's bytes.
pub type Chunk = Vec<u8>;

/// Splits the file at `path` into chunks of `chunk_size` bytes. The last
/// chunk may be shorter. An empty file gives an empty sequence.
///
/// # Errors
///
/// Will return an error if `chunk_size` is zero or the file can not be
/// opened or read.
pub fn split(path: &Path, chunk_size: usize) -> Result<Vec<Chunk>, StorageError> {
    check_chunk_size(chunk_size)?;

    let read_error = |err: std::io::Error| StorageError::Read {
        path: path.to_path_buf(),
        source: Located(err).into(),
    };

    let mut reader = BufReader::new(File::open(path).map_err(read_error)?);
    let mut chunks = Vec::new();

    loop {
        let mut chunk = Vec::with_capacity(chunk_size);
        let read = (&mut reader)
            .take(chunk_size as u64)
            .read_to_end(&mut chunk)
            .map_err(read_error)?;

        if read == 0 {
            break;
        }

        chunks.push(chunk);

        if read < chunk_size {
            break;
        }
    }

    tracing::debug!("split {} into {} chunks", path.display(), chunks.len());

    Ok(chunks)
}

/// In-memory counterpart of [`split`].
///
/// # Errors
///
/// Will return an error if `chunk_size` is zero.
pub fn split_bytes(bytes: &[u8], chunk_size: usize) -> Result<Vec<Chunk>, StorageError> {
    check_chunk_size(chunk_size)?;

    Ok(bytes.chunks(chunk_size).map(<[u8]>::to_vec).collect())
}

/// Reads up to `len` bytes of the file at `path`, starting at `offset`.
///
/// # Errors
///
/// Will return an error if the file can not be opened or read.
pub fn read_range(path: &Path, offset: u64, len: usize) -> Result<Chunk, StorageError> {
    let read_error = |err: std::io::Error| StorageError::Read {
        path: path.to_path_buf(),
        source: Located(err).into(),
    };

    let mut file = File::open(path).map_err(read_error)?;
    file.seek(SeekFrom::Start(offset)).map_err(read_error)?;

    let mut chunk = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut chunk).map_err(read_error)?;

    Ok(chunk)
}

/// Appends `chunk` to the file at `path`, creating the file if needed.
///
/// It returns the offset the chunk was written at.
///
/// # Errors
///
/// Will return a [`StorageError::Write`] if the file can not be opened or
/// written.
pub fn append(path: &Path, chunk: &[u8]) -> Result<u64, StorageError> {
    let write_error = |err: std::io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source: Located(err).into(),
    };

    let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(write_error)?;

    let offset = file.metadata().map_err(write_error)?.len();

    file.write_all(chunk).map_err(write_error)?;
    file.flush().map_err(write_error)?;

    Ok(offset)
}

/// Writes `chunks`, in order, to `output`.
///
/// If `output` already exists it is replaced, but only once the new content
/// is complete.
///
/// # Errors
///
/// Will return a [`StorageError::Write`] if the temporary file can not be
/// created in the output directory, a write fails, or the final rename fails.
/// In all those cases nothing is left at `output`.
pub fn combine(chunks: &[Chunk], output: &Path) -> Result<(), StorageError> {
    let write_error = |err: std::io::Error| StorageError::Write {
        path: output.to_path_buf(),
        source: Located(err).into(),
    };

    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut partial = tempfile::Builder::new()
        .prefix(".swarmshare-")
        .suffix(".part")
        .tempfile_in(directory)
        .map_err(write_error)?;

    for chunk in chunks {
        partial.write_all(chunk).map_err(write_error)?;
    }

    partial.flush().map_err(write_error)?;
    partial.as_file().sync_all().map_err(write_error)?;

    partial.persist(output).map_err(|err| write_error(err.error))?;

    tracing::debug!("combined {} chunks into {}", chunks.len(), output.display());

    Ok(())
}

fn check_chunk_size(chunk_size: usize) -> Result<(), StorageError> {
    if chunk_size == 0 {
        return Err(StorageError::InvalidChunkSize { chunk_size });
    }
    Ok(())
}
