//! Peer agent errors.
//!
//! Errors raised while fetching from one candidate ([`FetchError`]) are never
//! fatal: the download engine moves on to the next candidate. A
//! [`DownloadError`] fails the whole download and guarantees nothing was
//! written at the output path.
use std::path::PathBuf;

use swarmshare_content::StorageError;
use swarmshare_located_error::{Located, LocatedError};
use swarmshare_primitives::{Fingerprint, PeerAddress};
use swarmshare_wire_protocol::DecodeError;

/// Errors fetching one chunk from one candidate peer.
#[derive(thiserror::Error, Debug, Clone)]
pub enum FetchError {
    /// The peer refused or reset the connection.
    #[error("Peer {peer} is unavailable: {source}")]
    PeerUnavailable {
        peer: PeerAddress,
        source: LocatedError<'static, std::io::Error>,
    },

    #[error("Timed out talking to peer {peer}")]
    Timeout { peer: PeerAddress },

    #[error("Invalid response from peer {peer}: {source}")]
    InvalidResponse { peer: PeerAddress, source: DecodeError },

    /// The peer answered with an empty buffer: it does not have the chunk.
    #[error("Peer {peer} does not have the chunk {fingerprint}")]
    NotFound { peer: PeerAddress, fingerprint: Fingerprint },
}

impl FetchError {
    #[track_caller]
    pub(crate) fn unavailable(peer: PeerAddress, err: std::io::Error) -> Self {
        FetchError::PeerUnavailable {
            peer,
            source: Located(err).into(),
        }
    }
}

/// Errors asking the tracker for the candidates of a fingerprint.
#[derive(thiserror::Error, Debug, Clone)]
#[error("Unable to query the tracker for {fingerprint}: {source}")]
pub struct QueryError {
    pub fingerprint: Fingerprint,
    pub source: swarmshare_tracker_client::Error,
}

/// Errors that fail a whole download.
#[derive(thiserror::Error, Debug, Clone)]
pub enum DownloadError {
    /// The manifest was computed with another chunk size.
    #[error("The manifest uses chunks of {manifest} bytes but this peer uses {configured} bytes")]
    ChunkSizeMismatch { manifest: usize, configured: usize },

    #[error("The manifest has no fingerprints")]
    EmptyManifest,

    #[error(transparent)]
    Query(#[from] QueryError),

    /// Every candidate of a fingerprint failed.
    #[error("Unable to download {fingerprint} from any of its {candidates} candidates")]
    DownloadFailed { fingerprint: Fingerprint, candidates: usize },

    /// Some fingerprints have no owner at all.
    #[error("No peer owns {}", list(.fingerprints))]
    Unresolved { fingerprints: Vec<Fingerprint> },

    #[error("Unable to write the downloaded content: {0}")]
    Storage(#[from] StorageError),
}

/// Errors storing a chunk pushed by another peer.
#[derive(thiserror::Error, Debug, Clone)]
pub enum StoreError {
    /// The file name is empty, has more than one component, or is not a
    /// plain name.
    #[error("Invalid file name: {file_name:?}")]
    InvalidFileName { file_name: String },

    #[error("Unable to create the storage directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: LocatedError<'static, std::io::Error>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn list(fingerprints: &[Fingerprint]) -> String {
    fingerprints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use swarmshare_primitives::Fingerprint;

    use crate::error::DownloadError;

    #[test]
    fn unresolved() {
        let err = DownloadError::Unresolved {
            fingerprints: vec![Fingerprint::new(1), Fingerprint::new(22)],
        };

        let err_msg = format!("{err}");

        assert!(
            err_msg.contains("No peer owns 1, 22"),
            "Error message did not contain expected text: {err_msg}"
        );
    }

    #[test]
    fn download_failed() {
        let err = DownloadError::DownloadFailed {
            fingerprint: Fingerprint::new(42),
            candidates: 2,
        };

        let err_msg = format!("{err}");

        assert!(
            err_msg.contains("Unable to download 42 from any of its 2 candidates"),
            "Error message did not contain expected text: {err_msg}"
        );
    }
}
