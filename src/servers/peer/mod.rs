//! The peer server.
//!
//! It answers `download` requests with the bytes of the local content and
//! appends the chunks of `store` requests to the storage directory. Other
//! peers usually open one connection per request, but a connection can carry
//! any number of requests.
pub mod connection;

use std::net::SocketAddr;
use std::sync::Arc;

use swarmshare_peer_core::RequestHandler;

use super::{launcher, Error, RunningServer};

/// Starts the peer server on `bind_to`.
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

    launcher::start("peer", bind_to, move |stream, remote, halt| {
        connection::handle_connection(stream, remote, request_handler.clone(), max_field_size, halt)
    })
    .await
}
