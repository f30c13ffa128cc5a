use std::net::SocketAddr;

use swarmshare_located_error::LocatedError;

/// Errors starting or stopping a server.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("Unable to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: LocatedError<'static, std::io::Error>,
    },

    #[error("The server at {address} is already stopped")]
    AlreadyStopped { address: SocketAddr },

    #[error("The server task at {address} failed: {reason}")]
    Task { address: SocketAddr, reason: String },
}
