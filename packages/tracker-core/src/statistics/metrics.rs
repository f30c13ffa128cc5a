use serde::Serialize;

/// Metrics collected by the tracker.
///
/// - Number of connections accepted and closed.
/// - Number of requests handled, per request kind.
/// - Number of requests rejected, per reason.
#[derive(Debug, PartialEq, Default, Serialize)]
pub struct Metrics {
    /// Total number of peer connections accepted.
    pub connections_handled: u64,

    /// Total number of peer connections closed, for any reason.
    pub connections_closed: u64,

    /// Total number of `store` requests handled.
    pub stores_handled: u64,

    /// Total number of fingerprints received in `store` requests.
    pub fingerprints_stored: u64,

    /// Total number of `create` requests handled.
    pub creates_handled: u64,

    /// Total number of `delete` requests handled.
    pub deletes_handled: u64,

    /// Total number of `query` requests handled.
    pub queries_handled: u64,

    /// Total number of requests with a kind the tracker does not handle.
    pub unknown_requests: u64,

    /// Total number of connections closed because of a malformed message.
    pub decode_errors: u64,
}
