//! Content errors.
//!
//! Every variant that wraps an I/O error records the location where the
//! error was raised, to make failures in the middle of a download easier to
//! trace.
use std::path::PathBuf;

use swarmshare_located_error::LocatedError;

/// Errors reading or writing local content.
#[derive(thiserror::Error, Debug, Clone)]
pub enum StorageError {
    /// The file could not be opened or read.
    #[error("Unable to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: LocatedError<'static, std::io::Error>,
    },

    /// The output file could not be created or written.
    #[error("Unable to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: LocatedError<'static, std::io::Error>,
    },

    /// Chunks must have at least one byte.
    #[error("Invalid chunk size: {chunk_size}, it must be greater than zero")]
    InvalidChunkSize { chunk_size: usize },
}

/// Errors loading or saving a manifest.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ManifestError {
    #[error("Unable to read manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: LocatedError<'static, std::io::Error>,
    },

    #[error("Malformed manifest: {source}")]
    Malformed {
        source: LocatedError<'static, serde_json::Error>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
