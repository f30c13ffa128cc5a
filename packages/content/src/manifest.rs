//! Manifests.
//!
//! A peer can only download content it can name. A [`Manifest`] names a file
//! as the ordered list of the fingerprints of its chunks, together with the
//! chunk size used to compute them. Whoever owns the file produces the
//! manifest and shares it (it serializes to JSON); whoever wants the file
//! passes it to the download engine.
//!
//! ```json
//! {
//!   "chunk_size": 65536,
//!   "fingerprints": [8355840, 8355840, 1234]
//! }
//! ```
//!
//! In simple mode a file is advertised with a single whole-file fingerprint.
//! Such a manifest has a `chunk_size` of `0`.
use std::path::Path;

use serde::{Deserialize, Serialize};
use swarmshare_located_error::Located;
use swarmshare_primitives::Fingerprint;

use crate::chunk::{split, split_bytes};
use crate::error::{ManifestError, StorageError};
use crate::fingerprint::{fingerprint, fingerprint_file};

/// The ordered chunk fingerprints of a file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// The chunk size the fingerprints were computed with, `0` for a
    /// whole-file manifest.
    pub chunk_size: usize,

    /// The fingerprints, in file order.
    pub fingerprints: Vec<Fingerprint>,
}

impl Manifest {
    /// A manifest for content advertised as a single whole file.
    #[must_use]
    pub fn whole_file(fingerprint: Fingerprint) -> Self {
        Self {
            chunk_size: 0,
            fingerprints: vec![fingerprint],
        }
    }

    /// Builds the manifest of an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Will return an error if `chunk_size` is zero.
    pub fn from_bytes(bytes: &[u8], chunk_size: usize) -> Result<Self, StorageError> {
        let chunks = split_bytes(bytes, chunk_size)?;

        Ok(Self {
            chunk_size,
            fingerprints: chunks.iter().map(|chunk| fingerprint(chunk)).collect(),
        })
    }

    /// Builds the manifest of a local file.
    ///
    /// # Errors
    ///
    /// Will return an error if `chunk_size` is zero or the file can not be
    /// read.
    pub fn from_file(path: &Path, chunk_size: usize) -> Result<Self, StorageError> {
        let chunks = split(path, chunk_size)?;

        Ok(Self {
            chunk_size,
            fingerprints: chunks.iter().map(|chunk| fingerprint(chunk)).collect(),
        })
    }

    /// Builds the whole-file manifest of a local file.
    ///
    /// # Errors
    ///
    /// Will return an error if the file can not be read.
    pub fn whole_file_from(path: &Path) -> Result<Self, StorageError> {
        Ok(Self::whole_file(fingerprint_file(path)?))
    }

    #[must_use]
    pub fn is_chunked(&self) -> bool {
        self.chunk_size != 0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Pretty JSON representation.
    ///
    /// # Errors
    ///
    /// Will return an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(|err| ManifestError::Malformed {
            source: Located(err).into(),
        })
    }

    /// Parses a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Will return [`ManifestError::Malformed`] if the JSON is not a manifest.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(|err| ManifestError::Malformed {
            source: Located(err).into(),
        })
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Will return an error if the file can not be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path).map_err(|err| ManifestError::Read {
            path: path.to_path_buf(),
            source: Located(err).into(),
        })?;

        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use swarmshare_primitives::Fingerprint;

    use crate::error::ManifestError;
    use crate::manifest::Manifest;

    #[test]
    fn it_should_fingerprint_each_chunk_in_order() {
        let manifest = Manifest::from_bytes(&[1, 2, 3, 4, 5], 2).unwrap();

        assert_eq!(
            manifest,
            Manifest {
                chunk_size: 2,
                fingerprints: vec![Fingerprint::new(3), Fingerprint::new(7), Fingerprint::new(5)],
            }
        );
    }

    #[test]
    fn it_should_produce_the_same_manifest_from_a_file_and_from_its_content() {
        let content: Vec<u8> = (0..=255).cycle().take(3000).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&content).unwrap();

        assert_eq!(
            Manifest::from_file(file.path(), 1024).unwrap(),
            Manifest::from_bytes(&content, 1024).unwrap()
        );
    }

    #[test]
    fn a_whole_file_manifest_should_not_be_chunked() {
        let manifest = Manifest::whole_file(Fingerprint::new(42));

        assert!(!manifest.is_chunked());
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn it_should_be_loaded_from_its_json_representation() {
        let manifest = Manifest::from_bytes(b"hello world", 4).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(manifest.to_json().unwrap().as_bytes()).unwrap();

        assert_eq!(Manifest::load(file.path()).unwrap(), manifest);
    }

    #[test]
    fn it_should_reject_malformed_json() {
        let result = Manifest::from_json("{\"chunk_size\": 4}");

        assert!(matches!(result, Err(ManifestError::Malformed { .. })));
    }
}
