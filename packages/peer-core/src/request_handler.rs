//! Handles the requests received by a peer server.
//!
//! | request    | effect                                            | reply                         |
//! |------------|---------------------------------------------------|-------------------------------|
//! | `download` | reads the local content for the fingerprint       | the bytes, empty if not found |
//! | `store`    | appends the bytes to a file in the storage folder | none                          |
//!
//! Downloads are resolved against the [`LocalContentMap`] only. A stored
//! chunk is added to the map so it can be served right away.
use std::sync::Arc;

use swarmshare_located_error::Located;
use swarmshare_primitives::{Fingerprint, PeerAddress};
use swarmshare_wire_protocol::PeerRequest;

use crate::error::StoreError;
use crate::local_content::LocalContentMap;
use crate::storage::{ChunkStorage, StoredChunk};

/// What the peer server has to send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nothing,
    Chunk(Vec<u8>),
}

pub struct RequestHandler {
    content: Arc<LocalContentMap>,
    storage: ChunkStorage,
}

impl RequestHandler {
    #[must_use]
    pub fn new(content: &Arc<LocalContentMap>, storage: ChunkStorage) -> Self {
        Self {
            content: content.clone(),
            storage,
        }
    }

    /// Handles one request from `peer`.
    ///
    /// Failures are logged. They never close the connection: a failed
    /// download answers an empty buffer and a failed store answers nothing.
    pub async fn handle_request(&self, peer: PeerAddress, request: PeerRequest) -> Reply {
        match request {
            PeerRequest::Download(fingerprint) => Reply::Chunk(self.handle_download(peer, fingerprint).await),
            PeerRequest::Store { file_name, bytes } => {
                if let Err(err) = self.handle_store(peer, file_name, bytes).await {
                    tracing::warn!(%peer, "unable to store the pushed chunk: {err}");
                }
                Reply::Nothing
            }
        }
    }

    async fn handle_download(&self, peer: PeerAddress, fingerprint: Fingerprint) -> Vec<u8> {
        if let Some(bytes) = self.content.read(&fingerprint).await {
            tracing::debug!(%peer, %fingerprint, len = bytes.len(), "serving chunk");
            bytes
        } else {
            tracing::debug!(%peer, %fingerprint, "chunk not found");
            Vec::new()
        }
    }

    async fn handle_store(&self, peer: PeerAddress, file_name: String, bytes: Vec<u8>) -> Result<StoredChunk, StoreError> {
        let storage = self.storage.clone();

        let stored = tokio::task::spawn_blocking(move || storage.store(&file_name, &bytes))
            .await
            .map_err(|err| StoreError::CreateDirectory {
                path: self.storage.dir().to_path_buf(),
                source: Located(std::io::Error::other(err)).into(),
            })??;

        self.content
            .insert_stored(stored.fingerprint, stored.location.clone())
            .await;

        tracing::info!(%peer, fingerprint = %stored.fingerprint, path = %stored.location.path().display(), "stored chunk pushed by a peer");

        Ok(stored)
    }
}
