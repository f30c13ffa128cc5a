use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_PEER_PORT;

/// Configuration for the peer agent.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct Peer {
    /// The tracker to register with, `host:port` or just `host` (the default
    /// tracker port is used then). When missing the peer binary asks for it.
    pub tracker_address: Option<String>,

    /// The address where this agent serves chunks to other peers.
    pub bind_address: SocketAddr,

    /// The port other peers listen on. Candidates returned by the tracker
    /// are dialed on their host and this port.
    pub peer_port: u16,

    /// The directory whose files are advertised and watched.
    pub content_dir: PathBuf,

    /// The directory where chunks pushed by other peers are stored.
    pub storage_dir: PathBuf,

    /// Whether files are advertised whole or chunk by chunk.
    pub advertise: AdvertiseMode,

    /// Watch the content directory and keep the tracker updated.
    pub watch: bool,
}

impl Default for Peer {
    fn default() -> Self {
        Self {
            tracker_address: None,
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PEER_PORT),
            peer_port: DEFAULT_PEER_PORT,
            content_dir: PathBuf::from("./dataset"),
            storage_dir: PathBuf::from("./storage"),
            advertise: AdvertiseMode::default(),
            watch: true,
        }
    }
}

/// How local files are fingerprinted and advertised.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdvertiseMode {
    /// One fingerprint per file.
    Whole,
    /// One fingerprint per chunk of `network.chunk_size` bytes.
    #[default]
    Chunked,
}
