//! A client for the `SwarmShare` tracker.
//!
//! A peer keeps a single long-lived connection to its tracker. The tracker
//! identifies the peer by the remote address of that connection, so every
//! request of a peer must go through the same [`TrackerClient`], and the
//! tracker forgets everything the peer advertised as soon as the connection
//! closes.
//!
//! ```rust,no_run
//! use swarmshare_configuration::Network;
//! use swarmshare_primitives::Fingerprint;
//! use swarmshare_tracker_client::TrackerClient;
//!
//! # async fn run() -> Result<(), swarmshare_tracker_client::Error> {
//! let client = TrackerClient::connect("127.0.0.1:8080", &Network::default()).await?;
//!
//! client.store(&[Fingerprint::new(8_355_840)]).await?;
//!
//! let owners = client.query(Fingerprint::new(8_355_840)).await?;
//! # Ok(())
//! # }
//! ```
pub mod client;
pub mod error;

pub use client::TrackerClient;
pub use error::Error;
