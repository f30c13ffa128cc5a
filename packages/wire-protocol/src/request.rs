//! Requests.
//!
//! A request is the request kind, a string field, followed by the kind's
//! payload fields. Trackers and peer servers accept different sets of kinds,
//! so each role has its own request type: [`TrackerRequest`] and
//! [`PeerRequest`].
//!
//! Decoding is tolerant at the message boundary:
//!
//! - Fields that are not strings, received while waiting for a request kind,
//!   are discarded.
//! - A kind the role does not handle is returned as [`Inbound::Unknown`] so
//!   the caller can log it and keep reading from the same connection.
use std::str::FromStr;

use derive_more::Display;
use swarmshare_primitives::Fingerprint;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::codec::{FieldReader, FieldWriter};
use crate::error::DecodeError;
use crate::field::Field;

/// All the request kinds of the protocol.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    #[display("store")]
    Store,
    #[display("create")]
    Create,
    #[display("delete")]
    Delete,
    #[display("query")]
    Query,
    #[display("download")]
    Download,
}

impl RequestKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Store => "store",
            RequestKind::Create => "create",
            RequestKind::Delete => "delete",
            RequestKind::Query => "query",
            RequestKind::Download => "download",
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown request kind: {kind}")]
pub struct UnknownRequestKind {
    pub kind: String,
}

impl FromStr for RequestKind {
    type Err = UnknownRequestKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(RequestKind::Store),
            "create" => Ok(RequestKind::Create),
            "delete" => Ok(RequestKind::Delete),
            "query" => Ok(RequestKind::Query),
            "download" => Ok(RequestKind::Download),
            _ => Err(UnknownRequestKind { kind: s.to_string() }),
        }
    }
}

/// A request as received by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<T> {
    Request(T),

    /// The request kind is not handled by this role. No payload has been
    /// read.
    Unknown(String),
}

/// Requests handled by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerRequest {
    /// Registers the connection's peer for every fingerprint.
    Store(Vec<Fingerprint>),

    /// Registers the connection's peer for one fingerprint.
    Create(Fingerprint),

    /// Unregisters the connection's peer for one fingerprint.
    Delete(Fingerprint),

    /// Asks for the peers owning a fingerprint.
    Query(Fingerprint),
}

impl TrackerRequest {
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            TrackerRequest::Store(_) => RequestKind::Store,
            TrackerRequest::Create(_) => RequestKind::Create,
            TrackerRequest::Delete(_) => RequestKind::Delete,
            TrackerRequest::Query(_) => RequestKind::Query,
        }
    }

    /// Reads the next request from the stream.
    ///
    /// # Errors
    ///
    /// Will return a [`DecodeError`] if the connection closes or the payload
    /// fields are not the ones the kind requires.
    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut FieldReader<R>) -> Result<Inbound<Self>, DecodeError> {
        let kind = read_kind(reader).await?;

        let request = match kind.parse::<RequestKind>() {
            Ok(RequestKind::Store) => {
                let values = reader.read_integer_list().await?;
                TrackerRequest::Store(values.into_iter().map(Fingerprint::new).collect())
            }
            Ok(RequestKind::Create) => TrackerRequest::Create(Fingerprint::new(reader.read_integer().await?)),
            Ok(RequestKind::Delete) => TrackerRequest::Delete(Fingerprint::new(reader.read_integer().await?)),
            Ok(RequestKind::Query) => TrackerRequest::Query(Fingerprint::new(reader.read_integer().await?)),
            Ok(RequestKind::Download) | Err(_) => return Ok(Inbound::Unknown(kind)),
        };

        Ok(Inbound::Request(request))
    }

    /// Writes the request and flushes the stream.
    ///
    /// # Errors
    ///
    /// Will return an error if the stream can not be written.
    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut FieldWriter<W>) -> Result<(), std::io::Error> {
        writer.write_string(self.kind().as_str()).await?;

        match self {
            TrackerRequest::Store(fingerprints) => {
                writer
                    .write_integer_list(fingerprints.iter().map(Fingerprint::value).collect())
                    .await?;
            }
            TrackerRequest::Create(fingerprint) | TrackerRequest::Delete(fingerprint) | TrackerRequest::Query(fingerprint) => {
                writer.write_integer(fingerprint.value()).await?;
            }
        }

        writer.flush().await
    }
}

/// Requests handled by a peer server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerRequest {
    /// Asks for the bytes of a fingerprint the peer holds.
    Download(Fingerprint),

    /// Pushes bytes to be appended to a file in the peer's storage.
    Store { file_name: String, bytes: Vec<u8> },
}

impl PeerRequest {
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            PeerRequest::Download(_) => RequestKind::Download,
            PeerRequest::Store { .. } => RequestKind::Store,
        }
    }

    /// Reads the next request from the stream.
    ///
    /// # Errors
    ///
    /// Will return a [`DecodeError`] if the connection closes or the payload
    /// fields are not the ones the kind requires.
    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut FieldReader<R>) -> Result<Inbound<Self>, DecodeError> {
        let kind = read_kind(reader).await?;

        let request = match kind.parse::<RequestKind>() {
            Ok(RequestKind::Download) => PeerRequest::Download(Fingerprint::new(reader.read_integer().await?)),
            Ok(RequestKind::Store) => {
                let file_name = reader.read_string().await?;
                let bytes = reader.read_bytes().await?;
                PeerRequest::Store { file_name, bytes }
            }
            Ok(RequestKind::Create | RequestKind::Delete | RequestKind::Query) | Err(_) => return Ok(Inbound::Unknown(kind)),
        };

        Ok(Inbound::Request(request))
    }

    /// Writes the request and flushes the stream.
    ///
    /// # Errors
    ///
    /// Will return an error if the stream can not be written.
    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut FieldWriter<W>) -> Result<(), std::io::Error> {
        writer.write_string(self.kind().as_str()).await?;

        match self {
            PeerRequest::Download(fingerprint) => writer.write_integer(fingerprint.value()).await?,
            PeerRequest::Store { file_name, bytes } => {
                writer.write_string(file_name).await?;
                writer.write_field(&Field::Bytes(bytes.clone())).await?;
            }
        }

        writer.flush().await
    }
}

/// Skips fields until a string arrives and returns it as the request kind.
async fn read_kind<R: AsyncRead + Unpin>(reader: &mut FieldReader<R>) -> Result<String, DecodeError> {
    loop {
        match reader.read_field().await? {
            Field::String(kind) => return Ok(kind),
            other => {
                tracing::debug!("discarding stray {} field while waiting for a request kind", other.field_type());
            }
        }
    }
}
