//! Primitive types used by the `SwarmShare` tracker and peer agents.
//!
//! Both sides of the network address content with the same numeric
//! identifier, the [`Fingerprint`]. The tracker keys its registry with it and
//! the peer agents key their local content with it, so these types live in a
//! crate of their own that every other package depends on.
//!
//! Peers are identified by the socket address the tracker observed on the
//! connection, never by a self-reported identifier. See [`PeerAddress`].
use std::net::SocketAddr;

pub mod fingerprint;

pub use fingerprint::{Fingerprint, ParseFingerprintError};

/// The identity of a peer as seen by the listener that accepted its
/// connection (`host:port`).
pub type PeerAddress = SocketAddr;
