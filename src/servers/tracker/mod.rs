//! The tracker TCP server.
//!
//! Peers keep one connection open to the tracker for their whole session.
//! The remote socket address of the connection is the peer's identity: every
//! fingerprint it advertises is registered under that address and released
//! when the connection closes.
//!
//! Requests on a connection are handled strictly in order:
//!
//! ```text
//! read request kind ──> read payload ──> handle ──> write reply (query only)
//!        ^                                              │
//!        └──────────────────────────────────────────────┘
//! ```
//!
//! Unknown request kinds are logged and skipped. A malformed message, the
//! end of the stream or the server halt closes the connection.
pub mod connection;

use std::net::SocketAddr;
use std::sync::Arc;

use swarmshare_tracker_core::request_handler::RequestHandler;

use super::{launcher, Error, RunningServer};

/// Starts the tracker on `bind_to`.
///
/// # Errors
///
/// Will return an error if the address can not be bound.
pub async fn start(
    bind_to: SocketAddr,
    request_handler: &Arc<RequestHandler>,
    max_field_size: usize,
) -> Result<RunningServer, Error> {
    let request_handler = request_handler.clone();

    launcher::start("tracker", bind_to, move |stream, remote, halt| {
        connection::handle_connection(stream, remote, request_handler.clone(), max_field_size, halt)
    })
    .await
}
