//! Storage for chunks pushed by other peers.
//!
//! A `store` request names a file and carries a chunk. The chunk is appended
//! to that file inside the storage directory, and its fingerprint becomes
//! servable right away.
use std::path::{Component, Path, PathBuf};

use swarmshare_content::{append, fingerprint};
use swarmshare_located_error::Located;
use swarmshare_primitives::Fingerprint;

use crate::error::StoreError;
use crate::local_content::ContentLocation;

/// Where a stored chunk ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredChunk {
    pub fingerprint: Fingerprint,
    pub location: ContentLocation,
}

/// The storage directory of a peer.
#[derive(Debug, Clone)]
pub struct ChunkStorage {
    dir: PathBuf,
}

impl ChunkStorage {
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves a file name received from the network to a path inside the
    /// storage directory.
    ///
    /// # Errors
    ///
    /// Will return [`StoreError::InvalidFileName`] unless the name is a single
    /// plain path component.
    pub fn path_of(&self, file_name: &str) -> Result<PathBuf, StoreError> {
        let mut components = Path::new(file_name).components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if !file_name.contains(['/', '\\']) => Ok(self.dir.join(name)),
            _ => Err(StoreError::InvalidFileName {
                file_name: file_name.to_string(),
            }),
        }
    }

    /// Appends `bytes` to the file named `file_name`, creating the storage
    /// directory and the file if needed.
    ///
    /// This is blocking I/O.
    ///
    /// # Errors
    ///
    /// Will return an error if the name is not valid or the chunk can not be
    /// written.
    pub fn store(&self, file_name: &str, bytes: &[u8]) -> Result<StoredChunk, StoreError> {
        let path = self.path_of(file_name)?;

        std::fs::create_dir_all(&self.dir).map_err(|err| StoreError::CreateDirectory {
            path: self.dir.clone(),
            source: Located(err).into(),
        })?;

        let offset = append(&path, bytes)?;

        tracing::debug!(path = %path.display(), offset, len = bytes.len(), "chunk stored");

        Ok(StoredChunk {
            fingerprint: fingerprint(bytes),
            location: ContentLocation::Range {
                path,
                offset,
                len: bytes.len(),
            },
        })
    }
}
