use std::net::SocketAddr;
use std::time::Duration;

use swarmshare_configuration::Network;
use swarmshare_located_error::Located;
use swarmshare_primitives::{Fingerprint, PeerAddress};
use swarmshare_wire_protocol::{FieldReader, FieldWriter, TrackerRequest};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::error::Error;

struct Connection {
    reader: FieldReader<OwnedReadHalf>,
    writer: FieldWriter<OwnedWriteHalf>,
}

impl Connection {
    async fn query(&mut self, fingerprint: Fingerprint, read_timeout: Duration) -> Result<Vec<String>, Error> {
        TrackerRequest::Query(fingerprint).write_to(&mut self.writer).await?;

        let owners = timeout(read_timeout, self.reader.read_string_list())
            .await
            .map_err(|_| Error::ResponseTimeout)??;

        Ok(owners)
    }
}

/// A persistent connection to a tracker.
///
/// Requests are serialized: a request and its response are never interleaved
/// with another request, so the client can be shared between tasks.
///
/// A failed exchange leaves the stream in an unknown position, so the
/// connection is dropped and every later request fails with
/// [`Error::ConnectionLost`].
pub struct TrackerClient {
    tracker_address: String,
    local_address: SocketAddr,
    read_timeout: Duration,
    connection: Mutex<Option<Connection>>,
}

impl TrackerClient {
    /// Opens the connection to the tracker.
    ///
    /// # Errors
    ///
    /// Will return an error if the tracker can not be reached within the
    /// configured connect timeout.
    pub async fn connect(tracker_address: &str, network: &Network) -> Result<Self, Error> {
        let stream = match timeout(network.connect_timeout(), TcpStream::connect(tracker_address)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                return Err(Error::Connect {
                    address: tracker_address.to_string(),
                    source: Located(err).into(),
                })
            }
            Err(_) => {
                return Err(Error::ConnectTimeout {
                    address: tracker_address.to_string(),
                })
            }
        };

        let local_address = stream.local_addr().map_err(|err| Error::Connect {
            address: tracker_address.to_string(),
            source: Located(err).into(),
        })?;

        let (read_half, write_half) = stream.into_split();

        tracing::info!(tracker = tracker_address, %local_address, "connected to the tracker");

        Ok(Self {
            tracker_address: tracker_address.to_string(),
            local_address,
            read_timeout: network.read_timeout(),
            connection: Mutex::new(Some(Connection {
                reader: FieldReader::with_max_field_size(read_half, network.max_field_size),
                writer: FieldWriter::new(write_half),
            })),
        })
    }

    #[must_use]
    pub fn tracker_address(&self) -> &str {
        &self.tracker_address
    }

    /// The local end of the connection. It is the address the tracker knows
    /// this peer by.
    #[must_use]
    pub fn local_address(&self) -> SocketAddr {
        self.local_address
    }

    /// Advertises every fingerprint.
    ///
    /// # Errors
    ///
    /// Will return an error if the request can not be sent or an earlier
    /// request broke the connection.
    pub async fn store(&self, fingerprints: &[Fingerprint]) -> Result<(), Error> {
        self.send(&TrackerRequest::Store(fingerprints.to_vec())).await
    }

    /// Advertises one new fingerprint.
    ///
    /// # Errors
    ///
    /// Will return an error if the request can not be sent or an earlier
    /// request broke the connection.
    pub async fn create(&self, fingerprint: Fingerprint) -> Result<(), Error> {
        self.send(&TrackerRequest::Create(fingerprint)).await
    }

    /// Withdraws one fingerprint.
    ///
    /// # Errors
    ///
    /// Will return an error if the request can not be sent or an earlier
    /// request broke the connection.
    pub async fn delete(&self, fingerprint: Fingerprint) -> Result<(), Error> {
        self.send(&TrackerRequest::Delete(fingerprint)).await
    }

    /// Asks for the owners of a fingerprint.
    ///
    /// Addresses the tracker returns that can not be parsed are skipped.
    ///
    /// # Errors
    ///
    /// Will return an error if the request can not be sent, the response
    /// does not arrive within the read timeout or an earlier request already
    /// broke the connection.
    pub async fn query(&self, fingerprint: Fingerprint) -> Result<Vec<PeerAddress>, Error> {
        let mut guard = self.connection.lock().await;
        let connection = guard.as_mut().ok_or(Error::ConnectionLost)?;

        let owners = match connection.query(fingerprint, self.read_timeout).await {
            Ok(owners) => owners,
            Err(err) => {
                self.drop_connection(&mut guard, &err);
                return Err(err);
            }
        };

        drop(guard);

        Ok(owners
            .into_iter()
            .filter_map(|owner| match owner.parse::<PeerAddress>() {
                Ok(address) => Some(address),
                Err(err) => {
                    tracing::warn!(%fingerprint, %owner, "skipping invalid peer address from the tracker: {err}");
                    None
                }
            })
            .collect())
    }

    async fn send(&self, request: &TrackerRequest) -> Result<(), Error> {
        let mut guard = self.connection.lock().await;
        let connection = guard.as_mut().ok_or(Error::ConnectionLost)?;

        if let Err(err) = request.write_to(&mut connection.writer).await {
            let err = Error::from(err);
            self.drop_connection(&mut guard, &err);
            return Err(err);
        }

        tracing::debug!(tracker = %self.tracker_address, kind = %request.kind(), "request sent");

        Ok(())
    }

    fn drop_connection(&self, connection: &mut Option<Connection>, err: &Error) {
        if connection.take().is_some() {
            tracing::warn!(tracker = %self.tracker_address, "closing the tracker connection: {err}");
        }
    }
}
