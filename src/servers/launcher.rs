//! The accept loop shared by the servers.
use std::future::Future;
use std::net::SocketAddr;

use swarmshare_located_error::Located;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinSet;

use super::signals::shutdown_signal;
use super::{Error, RunningServer};

/// Binds `bind_to` and spawns the accept loop.
///
/// Every accepted connection is served by `serve_connection` on its own task.
/// On halt the loop stops accepting, flags the halt to the connection tasks
/// and waits for all of them to finish.
///
/// # Errors
///
/// Will return an error if the address can not be bound.
pub async fn start<F, Fut>(server: &'static str, bind_to: SocketAddr, serve_connection: F) -> Result<RunningServer, Error>
where
    F: Fn(TcpStream, SocketAddr, watch::Receiver<bool>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind_to).await.map_err(|err| Error::Bind {
        address: bind_to,
        source: Located(err).into(),
    })?;

    let local_addr = listener.local_addr().map_err(|err| Error::Bind {
        address: bind_to,
        source: Located(err).into(),
    })?;

    let (tx_halt, rx_halt) = oneshot::channel();

    let task = tokio::spawn(accept_loop(server, listener, rx_halt, serve_connection));

    tracing::info!(server, %local_addr, "server started");

    Ok(RunningServer::new(local_addr, tx_halt, task))
}

async fn accept_loop<F, Fut>(
    server: &'static str,
    listener: TcpListener,
    rx_halt: oneshot::Receiver<super::signals::Halted>,
    serve_connection: F,
) where
    F: Fn(TcpStream, SocketAddr, watch::Receiver<bool>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (tx_connections_halt, rx_connections_halt) = watch::channel(false);
    let mut connections = JoinSet::new();

    let halt = shutdown_signal(rx_halt);
    tokio::pin!(halt);

    loop {
        tokio::select! {
            () = &mut halt => break,

            accepted = listener.accept() => match accepted {
                Ok((stream, remote)) => {
                    connections.spawn(serve_connection(stream, remote, rx_connections_halt.clone()));
                }
                Err(err) => tracing::warn!(server, "unable to accept a connection: {err}"),
            },

            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(err) = joined {
                    tracing::error!(server, "connection task failed: {err}");
                }
            }
        }
    }

    tracing::info!(server, open = connections.len(), "stopping the server");

    drop(listener);
    drop(rx_connections_halt);

    if tx_connections_halt.send(true).is_err() {
        tracing::debug!(server, "no connection left to halt");
    }

    while let Some(joined) = connections.join_next().await {
        if let Err(err) = joined {
            tracing::error!(server, "connection task failed: {err}");
        }
    }

    tracing::info!(server, "server stopped");
}
