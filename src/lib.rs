//! **`SwarmShare`** is a minimal peer-to-peer content distribution network.
//!
//! A tracker keeps, for every content fingerprint, the set of peers that hold
//! it. Peer agents advertise the content of a local directory, serve it to
//! other peers and download the content they miss from whichever advertised
//! peer answers.
//!
//! ```text
//!              store / create / delete / query
//!   ┌────────┐ ──────────────────────────────► ┌─────────┐
//!   │ peer A │                                 │ tracker │
//!   └────────┘ ◄────── download / store ────── └─────────┘
//!       ▲                                           ▲
//!       │ download / store                          │
//!       ▼                                           │
//!   ┌────────┐ ─────────────────────────────────────┘
//!   │ peer B │
//!   └────────┘
//! ```
//!
//! # Table of contents
//!
//! - [Binaries](#binaries)
//! - [Configuration](#configuration)
//! - [Packages](#packages)
//!
//! # Binaries
//!
//! - `swarmshare-tracker` runs the tracker. It listens on port `8080` by
//!   default.
//! - `swarmshare-peer` runs a peer agent with an interactive menu. Its peer
//!   server listens on port `9090` by default.
//!
//! ```text
//! swarmshare-tracker
//! swarmshare-peer --tracker 10.0.0.1
//! ```
//!
//! # Configuration
//!
//! Both binaries read the same TOML configuration, from
//! `./share/default/config/swarmshare.toml`, from the file named by
//! `SWARMSHARE_CONFIG_TOML_PATH` or from the `SWARMSHARE_CONFIG_TOML`
//! environment variable. Every value has a default.
//!
//! Refer to the [`swarmshare-configuration`](swarmshare_configuration)
//! package for the settings.
//!
//! # Packages
//!
//! - [`swarmshare-wire-protocol`](swarmshare_wire_protocol): typed fields and
//!   requests.
//! - [`swarmshare-content`](swarmshare_content): fingerprints, chunks and
//!   manifests.
//! - [`swarmshare-tracker-core`](swarmshare_tracker_core): the ownership
//!   registry and the tracker request handler.
//! - [`swarmshare-tracker-client`](swarmshare_tracker_client): the peer side
//!   of the tracker protocol.
//! - [`swarmshare-peer-core`](swarmshare_peer_core): local content, the peer
//!   request handler and the download engine.
pub mod agent;
pub mod app;
pub mod bootstrap;
pub mod console;
pub mod container;
pub mod servers;
pub mod watcher;
