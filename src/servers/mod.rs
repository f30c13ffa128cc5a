//! The TCP servers: the tracker and the peer server.
//!
//! Both servers share the same lifecycle:
//!
//! ```text
//! start(bind_to) ──> accept loop ──> one task per connection
//!                        │
//! stop() / Ctrl-C ───────┴──> connections closed ──> task ends
//! ```
//!
//! A server is started with [`tracker::start`] or [`peer::start`], which bind
//! the listener before returning, and is stopped by calling `stop` on the
//! returned handle.
pub mod error;
pub mod launcher;
pub mod peer;
pub mod running;
pub mod signals;
pub mod tracker;

pub use error::Error;
pub use running::RunningServer;
