//! A client for other peers' servers.
//!
//! Every request opens its own connection. Peer servers are short-lived
//! contacts: a download talks to a candidate once per chunk and moves on to
//! the next candidate on any failure.
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use swarmshare_configuration::Network;
use swarmshare_content::Chunk;
use swarmshare_primitives::{Fingerprint, PeerAddress};
use swarmshare_wire_protocol::{FieldReader, FieldWriter, PeerRequest};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::download::ChunkFetcher;
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct TcpPeerClient {
    connect_timeout: Duration,
    read_timeout: Duration,
    max_field_size: usize,
}

impl TcpPeerClient {
    #[must_use]
    pub fn new(network: &Network) -> Self {
        Self {
            connect_timeout: network.connect_timeout(),
            read_timeout: network.read_timeout(),
            max_field_size: network.max_field_size,
        }
    }

    async fn connect(&self, peer: PeerAddress) -> Result<TcpStream, FetchError> {
        match timeout(self.connect_timeout, TcpStream::connect(peer)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(err)) => Err(FetchError::unavailable(peer, err)),
            Err(_) => Err(FetchError::Timeout { peer }),
        }
    }

    /// Asks `peer` for the bytes of `fingerprint`.
    ///
    /// # Errors
    ///
    /// Will return [`FetchError::NotFound`] if the peer answers with an empty
    /// buffer, or another [`FetchError`] if the exchange fails.
    pub async fn download(&self, peer: PeerAddress, fingerprint: Fingerprint) -> Result<Chunk, FetchError> {
        let stream = self.connect(peer).await?;
        let (read_half, write_half) = stream.into_split();
        let mut reader = FieldReader::with_max_field_size(read_half, self.max_field_size);
        let mut writer = FieldWriter::new(write_half);

        PeerRequest::Download(fingerprint)
            .write_to(&mut writer)
            .await
            .map_err(|err| FetchError::unavailable(peer, err))?;

        let chunk = timeout(self.read_timeout, reader.read_bytes())
            .await
            .map_err(|_| FetchError::Timeout { peer })?
            .map_err(|source| FetchError::InvalidResponse { peer, source })?;

        if chunk.is_empty() {
            return Err(FetchError::NotFound { peer, fingerprint });
        }

        Ok(chunk)
    }

    /// Pushes `bytes` to `peer`, to be appended to `file_name` in its storage.
    ///
    /// The peer does not answer a store request.
    ///
    /// # Errors
    ///
    /// Will return an error if the peer can not be reached or the request can
    /// not be written.
    pub async fn push(&self, peer: PeerAddress, file_name: &str, bytes: Vec<u8>) -> Result<(), FetchError> {
        let stream = self.connect(peer).await?;
        let (_read_half, write_half) = stream.into_split();
        let mut writer = FieldWriter::new(write_half);

        let len = bytes.len();

        PeerRequest::Store {
            file_name: file_name.to_string(),
            bytes,
        }
        .write_to(&mut writer)
        .await
        .map_err(|err| FetchError::unavailable(peer, err))?;

        tracing::debug!(%peer, file_name, len, "chunk pushed");

        Ok(())
    }
}

impl ChunkFetcher for TcpPeerClient {
    fn fetch(&self, peer: PeerAddress, fingerprint: Fingerprint) -> BoxFuture<'_, Result<Chunk, FetchError>> {
        self.download(peer, fingerprint).boxed()
    }
}
