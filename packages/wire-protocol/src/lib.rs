//! Primitive types and functions for the `SwarmShare` wire protocol.
//!
//! Every message is a sequence of self-describing typed fields written
//! directly to a TCP stream. There is no message-level length prefix and no
//! version byte: readers decode the fields in the order and with the types the
//! writer used.
//!
//! Each field starts with a one-byte tag followed by the body:
//!
//! | tag    | type         | body                                                   |
//! |--------|--------------|--------------------------------------------------------|
//! | `0x01` | string       | `u32` byte length, UTF-8 bytes                         |
//! | `0x02` | integer      | `u64`                                                  |
//! | `0x03` | byte buffer  | `u32` length, bytes                                    |
//! | `0x04` | integer list | `u32` count, `count` x `u64`                           |
//! | `0x05` | string list  | `u32` count, `count` x (`u32` length, UTF-8 bytes)     |
//!
//! All numbers are big-endian.
//!
//! The first field of a request is always the request kind, a string. The
//! fields that follow depend on the kind and on the role of the node that
//! receives the request:
//!
//! Tracker:
//!
//! | kind     | request fields | response fields                  |
//! |----------|----------------|----------------------------------|
//! | `store`  | integer list   | none                             |
//! | `create` | integer        | none                             |
//! | `delete` | integer        | none                             |
//! | `query`  | integer        | string list, possibly empty      |
//!
//! Peer server:
//!
//! | kind       | request fields             | response fields                 |
//! |------------|----------------------------|---------------------------------|
//! | `download` | integer                    | byte buffer, empty if not found |
//! | `store`    | string, byte buffer        | none                            |
//!
//! Refer to [`request`] for the requests and to [`codec`] for the readers and
//! writers.
pub mod codec;
pub mod error;
pub mod field;
pub mod request;

pub use codec::{FieldReader, FieldWriter};
pub use error::DecodeError;
pub use field::{Field, FieldType};
pub use request::{Inbound, PeerRequest, RequestKind, TrackerRequest};

/// Default limit for a single field body.
pub const DEFAULT_MAX_FIELD_SIZE: usize = 64 * 1024 * 1024;
