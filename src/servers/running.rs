use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::signals::Halted;
use super::Error;

/// A started server.
///
/// Dropping the handle stops the server too, without waiting for it.
#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    halt_task: oneshot::Sender<Halted>,
    task: JoinHandle<()>,
}

impl RunningServer {
    pub(crate) fn new(local_addr: SocketAddr, halt_task: oneshot::Sender<Halted>, task: JoinHandle<()>) -> Self {
        Self {
            local_addr,
            halt_task,
            task,
        }
    }

    /// The address the server is bound to. When started on port `0` it has
    /// the port the OS assigned.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops the server and waits until every connection is closed.
    ///
    /// # Errors
    ///
    /// Will return an error if the server had already stopped or its task
    /// panicked.
    pub async fn stop(self) -> Result<(), Error> {
        self.halt_task.send(Halted::Normal).map_err(|_| Error::AlreadyStopped {
            address: self.local_addr,
        })?;

        self.task.await.map_err(|err| Error::Task {
            address: self.local_addr,
            reason: err.to_string(),
        })
    }

    /// Waits until the server stops on its own, on Ctrl-C.
    ///
    /// # Errors
    ///
    /// Will return an error if the server task panicked.
    pub async fn wait(self) -> Result<(), Error> {
        let Self {
            local_addr,
            halt_task,
            task,
        } = self;

        let result = task.await.map_err(|err| Error::Task {
            address: local_addr,
            reason: err.to_string(),
        });

        drop(halt_task);

        result
    }
}
