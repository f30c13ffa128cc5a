//! The core `swarmshare-tracker-core` crate contains the tracker logic which
//! is independent of the delivery layer.
//!
//! It contains the tracker services and their dependencies. It's a domain
//! layer which does not specify how the peers connect to the `Tracker`.
//!
//! ```text
//!   Delivery layer  |   Domain layer
//! -----------------------------------
//!       TCP server  |-> Core tracker
//! ```
//!
//! # Table of contents
//!
//! - [Introduction](#introduction)
//! - [Ownership](#ownership)
//! - [Request handler](#request-handler)
//! - [Statistics](#statistics)
//!
//! # Introduction
//!
//! The tracker coordinates a `SwarmShare` network. Peers advertise the
//! fingerprints of the content they hold, and ask which peers hold the
//! fingerprints they want. The tracker never sees the content itself.
//!
//! It has two main responsibilities:
//!
//! - To keep the registry of who owns what, consistent under concurrent
//!   connections.
//! - To answer **query** requests with the owners of a fingerprint.
//!
//! # Ownership
//!
//! The registry maps every fingerprint to its owners and every owner to its
//! fingerprints.
//!
//! Please refer to the [`ownership`] documentation.
//!
//! # Request handler
//!
//! The `RequestHandler` applies `store`, `create`, `delete` and `query`
//! requests to the registry and releases a peer's content when its connection
//! closes.
//!
//! Please refer to the [`request_handler`] documentation.
//!
//! # Statistics
//!
//! The tracker counts connections and requests.
//!
//! Please refer to the [`statistics`] documentation.
pub mod ownership;
pub mod request_handler;
pub mod statistics;

pub mod test_helpers;
