//! Content ownership data structures.
//!
//! The tracker stores, for every advertised fingerprint, the set of peers
//! that hold the content, and for every peer, the set of fingerprints it has
//! advertised. The two maps are kept consistent with each other:
//!
//! ```text
//! peer ∈ owners[fingerprint]  ⇔  fingerprint ∈ fingerprints_of[peer]
//! ```
//!
//! An entry whose set becomes empty is removed, so the tracker never keeps
//! fingerprints nobody owns or peers that own nothing.
//!
//! We can represent the data stored in memory by the tracker with this JSON
//! object:
//!
//! ```json
//! {
//!     "owners": {
//!         "8355840": ["10.0.0.2:51514", "10.0.0.3:40122"],
//!         "1234": ["10.0.0.2:51514"]
//!     },
//!     "fingerprints_of": {
//!         "10.0.0.2:51514": [1234, 8355840],
//!         "10.0.0.3:40122": [8355840]
//!     }
//! }
//! ```
//!
//! Peers are identified by the remote socket address of their tracker
//! connection. When the connection closes every fingerprint it advertised is
//! released.
pub mod repository;

use derive_more::Constructor;
use serde::Serialize;

/// Aggregate counters of the ownership registry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Constructor)]
pub struct RegistryMetrics {
    /// Number of fingerprints with at least one owner.
    pub fingerprints: u64,

    /// Number of peers owning at least one fingerprint.
    pub peers: u64,

    /// Number of (fingerprint, peer) ownership pairs.
    pub ownerships: u64,
}
