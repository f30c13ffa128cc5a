//! The core `swarmshare-peer-core` crate contains the peer agent logic which
//! is independent of the delivery layer.
//!
//! ```text
//!   Delivery layer  |   Domain layer
//! -----------------------------------------------------
//!      Peer server  |-> Request handler -> Local content
//!          Console  |-> Download engine -> Tracker client, peer client
//! ```
//!
//! # Table of contents
//!
//! - [Local content](#local-content)
//! - [Request handler](#request-handler)
//! - [Downloads](#downloads)
//!
//! # Local content
//!
//! A peer advertises the fingerprints of the files in its content folder,
//! either one fingerprint per file or one per chunk. The
//! [`LocalContentMap`](local_content::LocalContentMap) tells the server where
//! the bytes of every advertised fingerprint are.
//!
//! Please refer to the [`local_content`] documentation.
//!
//! # Request handler
//!
//! Other peers download chunks from this peer and push chunks into its
//! storage folder.
//!
//! Please refer to the [`request_handler`] and [`storage`] documentation.
//!
//! # Downloads
//!
//! Downloads take a manifest, ask the tracker who owns every chunk and fetch
//! the chunks one by one, failing over between the owners.
//!
//! Please refer to the [`download`] and [`fetcher`] documentation.
pub mod download;
pub mod error;
pub mod fetcher;
pub mod local_content;
pub mod request_handler;
pub mod storage;

pub use download::{CandidateSource, ChunkFetcher, DownloadEngine, DownloadReport};
pub use error::{DownloadError, FetchError, QueryError, StoreError};
pub use fetcher::TcpPeerClient;
pub use local_content::{scan_directory, scan_file, ContentEntry, ContentLocation, LocalContentMap};
pub use request_handler::{Reply, RequestHandler};
pub use storage::{ChunkStorage, StoredChunk};
