//! Content handling for `SwarmShare` peers.
//!
//! This package has the pieces a peer needs to turn files into addressable
//! content and back:
//!
//! - [`fingerprint`]: the content fingerprint function.
//! - [`chunk`]: splitting files into fixed-size chunks and combining chunks
//!   into an output file.
//! - [`manifest`]: the ordered list of chunk fingerprints that describes a
//!   file, which is what a peer needs to download it.
//!
//! ```text
//!  file --split--> [chunk 0, chunk 1, ..., chunk n] --fingerprint--> manifest
//!                                 |
//!  output <------combine----------+
//! ```
//!
//! All the functions here are synchronous and do blocking I/O. Async callers
//! should run them with `tokio::task::spawn_blocking`.
pub mod chunk;
pub mod error;
pub mod fingerprint;
pub mod manifest;

pub use chunk::{append, combine, read_range, split, split_bytes, Chunk};
pub use error::{ManifestError, StorageError};
pub use fingerprint::{fingerprint, fingerprint_file};
pub use manifest::Manifest;
