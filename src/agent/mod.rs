//! The peer agent.
//!
//! The agent puts the peer pieces together:
//!
//! ```text
//!                 ┌──────────── LocalContentMap ◄──── ContentUpdater ◄── ContentWatcher
//!                 │                   │                     │
//!  other peers ──►│ peer server ◄─────┘                     ▼
//!                 │                                    TrackerClient ──► tracker
//!  console ──────►│ download engine ──► TcpPeerClient ──► other peers
//!                 └──────────────────────┘
//! ```
//!
//! Starting an agent:
//!
//! 1. Scans the content directory and fills the [`LocalContentMap`].
//! 2. Starts the peer server, so the content is servable before it is
//!    advertised.
//! 3. Connects to the tracker and advertises every fingerprint with a single
//!    `store` request.
//! 4. Watches the content directory, when enabled, and keeps the tracker up
//!    to date.
pub mod error;
pub mod updates;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use swarmshare_configuration::{AdvertiseMode, Network, Peer, DEFAULT_TRACKER_PORT};
use swarmshare_content::{Manifest, StorageError};
use swarmshare_located_error::Located;
use swarmshare_peer_core::{
    scan_directory, CandidateSource, ChunkFetcher, ChunkStorage, DownloadEngine, DownloadError, DownloadReport, FetchError,
    LocalContentMap, RequestHandler, TcpPeerClient,
};
use swarmshare_primitives::{Fingerprint, PeerAddress};
use swarmshare_tracker_client::TrackerClient;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use self::error::Error;
use self::updates::{Announcer, ContentUpdater, WATCH_CHANNEL_CAPACITY};
use crate::servers::{self, RunningServer};
use crate::watcher::ContentWatcher;

/// The tracker address with the default tracker port when it has none.
///
/// ```rust
/// use swarmshare::agent::tracker_endpoint;
///
/// assert_eq!(tracker_endpoint("10.0.0.1"), "10.0.0.1:8080");
/// assert_eq!(tracker_endpoint("10.0.0.1:7070"), "10.0.0.1:7070");
/// assert_eq!(tracker_endpoint("tracker.local"), "tracker.local:8080");
/// ```
#[must_use]
pub fn tracker_endpoint(address: &str) -> String {
    let address = address.trim();

    if address.parse::<SocketAddr>().is_ok() {
        return address.to_string();
    }

    if let Ok(ip) = address.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_TRACKER_PORT).to_string();
    }

    match address.rsplit_once(':') {
        Some((_, port)) if port.parse::<u16>().is_ok() => address.to_string(),
        _ => format!("{address}:{DEFAULT_TRACKER_PORT}"),
    }
}

struct Watch {
    watcher: Option<ContentWatcher>,
    updates: JoinHandle<()>,
}

/// A running peer agent.
pub struct PeerAgent {
    content_dir: PathBuf,
    mode: AdvertiseMode,
    chunk_size: usize,
    content: Arc<LocalContentMap>,
    tracker: Arc<TrackerClient>,
    peer_client: Arc<TcpPeerClient>,
    engine: DownloadEngine,
    server: RunningServer,
    watch: Option<Watch>,
}

impl PeerAgent {
    /// Starts an agent registered with the tracker at `tracker_address`.
    ///
    /// # Errors
    ///
    /// Will return an error if the directories can not be prepared, the
    /// content can not be scanned, the peer server can not be bound, the
    /// tracker can not be reached or the watch can not be set up.
    pub async fn start(tracker_address: &str, peer: &Peer, network: &Network) -> Result<Self, Error> {
        let content_dir = prepare_directory(&peer.content_dir)?;
        let storage_dir = prepare_directory(&peer.storage_dir)?;

        let content = Arc::new(LocalContentMap::default());

        let entries = {
            let (dir, mode, chunk_size) = (content_dir.clone(), peer.advertise, network.chunk_size);
            tokio::task::spawn_blocking(move || scan_directory(&dir, mode, chunk_size))
                .await
                .map_err(|err| Error::Task {
                    task: "scan",
                    reason: err.to_string(),
                })??
        };

        content.insert_all(entries).await;

        let request_handler = Arc::new(RequestHandler::new(&content, ChunkStorage::new(&storage_dir)));
        let server = servers::peer::start(peer.bind_address, &request_handler, network.max_field_size).await?;

        let tracker = Arc::new(TrackerClient::connect(&tracker_endpoint(tracker_address), network).await?);

        let fingerprints = content.fingerprints().await;
        tracker.store(&fingerprints).await?;

        tracing::info!(
            tracker = tracker.tracker_address(),
            identity = %tracker.local_address(),
            fingerprints = fingerprints.len(),
            "content advertised"
        );

        let watch = if peer.watch {
            let (sender, receiver) = mpsc::channel(WATCH_CHANNEL_CAPACITY);

            let announcer: Arc<dyn Announcer> = tracker.clone();
            let updater = ContentUpdater::new(&content, &announcer, peer.advertise, network.chunk_size);
            let updates = tokio::spawn(updater.run(receiver));

            let watcher = ContentWatcher::start(&content_dir, sender)?;

            Some(Watch {
                watcher: Some(watcher),
                updates,
            })
        } else {
            None
        };

        let peer_client = Arc::new(TcpPeerClient::new(network));

        let candidate_source: Arc<dyn CandidateSource> = tracker.clone();
        let chunk_fetcher: Arc<dyn ChunkFetcher> = peer_client.clone();
        let engine = DownloadEngine::new(&candidate_source, &chunk_fetcher, network.chunk_size, peer.peer_port);

        Ok(Self {
            content_dir,
            mode: peer.advertise,
            chunk_size: network.chunk_size,
            content,
            tracker,
            peer_client,
            engine,
            server,
            watch,
        })
    }

    #[must_use]
    pub fn content(&self) -> &Arc<LocalContentMap> {
        &self.content
    }

    #[must_use]
    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// The address the tracker knows this peer by.
    #[must_use]
    pub fn identity(&self) -> PeerAddress {
        self.tracker.local_address()
    }

    /// The address of this agent's peer server.
    #[must_use]
    pub fn server_address(&self) -> SocketAddr {
        self.server.local_addr()
    }

    /// Asks the tracker who owns a fingerprint.
    ///
    /// # Errors
    ///
    /// Will return an error if the tracker can not be queried.
    pub async fn query(&self, fingerprint: Fingerprint) -> Result<Vec<PeerAddress>, swarmshare_tracker_client::Error> {
        self.tracker.query(fingerprint).await
    }

    /// Downloads the content of a manifest into `output`.
    ///
    /// # Errors
    ///
    /// See [`DownloadEngine::download`].
    pub async fn download(&self, manifest: &Manifest, output: &Path) -> Result<DownloadReport, DownloadError> {
        self.engine.download(manifest, output).await
    }

    /// Builds the manifest other peers need to download a local file, with
    /// the fingerprints this agent advertises.
    ///
    /// # Errors
    ///
    /// Will return an error if the file can not be read.
    pub async fn manifest_of(&self, path: &Path) -> Result<Manifest, StorageError> {
        let (path, mode, chunk_size) = (path.to_path_buf(), self.mode, self.chunk_size);

        tokio::task::spawn_blocking(move || match mode {
            AdvertiseMode::Whole => Manifest::whole_file_from(&path),
            AdvertiseMode::Chunked => Manifest::from_file(&path, chunk_size),
        })
        .await
        .map_err(|err| StorageError::Read {
            path: self.content_dir.clone(),
            source: Located(std::io::Error::other(err)).into(),
        })?
    }

    /// Pushes `bytes` into the storage directory of another peer.
    ///
    /// # Errors
    ///
    /// Will return an error if the peer can not be reached.
    pub async fn push(&self, peer: PeerAddress, file_name: &str, bytes: Vec<u8>) -> Result<(), FetchError> {
        self.peer_client.push(peer, file_name, bytes).await
    }

    /// Stops the watch, the content updates and the peer server.
    ///
    /// The tracker connection closes when the agent is dropped, which
    /// releases the advertised content.
    ///
    /// # Errors
    ///
    /// Will return an error if a task failed.
    pub async fn stop(self) -> Result<(), Error> {
        if let Some(mut watch) = self.watch {
            drop(watch.watcher.take());

            watch.updates.await.map_err(|err| Error::Task {
                task: "content updates",
                reason: err.to_string(),
            })?;
        }

        self.server.stop().await?;

        tracing::info!("peer agent stopped");

        Ok(())
    }
}

/// Creates the directory if needed and returns its canonical path, which is
/// also the prefix of the paths the watcher reports.
fn prepare_directory(dir: &Path) -> Result<PathBuf, Error> {
    let directory_error = |err: std::io::Error| Error::Directory {
        path: dir.to_path_buf(),
        source: Located(err).into(),
    };

    std::fs::create_dir_all(dir).map_err(directory_error)?;

    dir.canonicalize().map_err(directory_error)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::tracker_endpoint;

    #[rstest]
    #[case("10.0.0.1", "10.0.0.1:8080")]
    #[case(" 10.0.0.1 ", "10.0.0.1:8080")]
    #[case("10.0.0.1:7070", "10.0.0.1:7070")]
    #[case("::1", "[::1]:8080")]
    #[case("[::1]:7070", "[::1]:7070")]
    #[case("localhost", "localhost:8080")]
    #[case("localhost:7070", "localhost:7070")]
    fn it_should_add_the_default_tracker_port_when_missing(#[case] address: &str, #[case] expected: &str) {
        assert_eq!(tracker_endpoint(address), expected);
    }
}
