//! Signals used to stop the servers.
use derive_more::Display;
use tokio::sync::{oneshot, watch};

/// The message sent to a server to stop it.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Halted {
    #[display("normal")]
    Normal,
}

/// Resolves on Ctrl-C or the halt signal, whichever comes first.
///
/// A dropped halt sender counts as a halt signal.
pub async fn shutdown_signal(rx_halt: oneshot::Receiver<Halted>) {
    let halt = async {
        match rx_halt.await {
            Ok(signal) => tracing::debug!(%signal, "halt signal received"),
            Err(_) => tracing::debug!("halt sender dropped"),
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::error!("unable to listen for Ctrl-C: {err}");
            }
        }
        () = halt => {}
    }
}

/// Resolves once every connection has to be closed.
pub async fn connections_halted(halt: &mut watch::Receiver<bool>) {
    while !*halt.borrow_and_update() {
        if halt.changed().await.is_err() {
            return;
        }
    }
}
