pub mod handler;
pub mod listener;
pub mod sender;

/// An statistics event. It is used to collect tracker metrics.
///
/// - `Connection` and `Disconnection` bound a peer session.
/// - `Store`, `Create`, `Delete` and `Query` are handled requests.
/// - `UnknownRequest` is a request kind the tracker does not handle.
/// - `DecodeError` is a malformed message that closed the connection.
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Connection,
    Disconnection,
    Store { fingerprints: usize },
    Create,
    Delete,
    Query,
    UnknownRequest,
    DecodeError,
}
