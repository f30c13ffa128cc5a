//! Request handler.
//!
//! The [`RequestHandler`] applies the requests received on a peer connection
//! to the ownership registry and produces the reply the server has to send
//! back. It also handles the session boundaries: when a connection closes,
//! for any reason, everything the peer advertised is released.
//!
//! ```text
//! accept ──> handle_connection
//!              │
//!              ├──> handle_request (store | create | delete | query) ──> Reply
//!              ├──> handle_unknown_request
//!              │
//! close  ──> handle_disconnection ──> cleanup of the peer's fingerprints
//! ```
//!
//! The handler does no I/O. The delivery layer reads requests, calls the
//! handler and writes replies.
use std::sync::Arc;

use swarmshare_primitives::PeerAddress;
use swarmshare_wire_protocol::TrackerRequest;

use crate::ownership::repository::in_memory::InMemoryOwnershipRepository;
use crate::statistics::event::sender::EventSender;
use crate::statistics::event::Event;

/// What the server must send back after a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The request kind has no response.
    Nothing,

    /// The owners of the queried fingerprint, possibly none.
    Peers(Vec<PeerAddress>),
}

/// Handles the requests of the peers connected to the tracker.
pub struct RequestHandler {
    /// The ownership registry.
    ownership_repository: Arc<InMemoryOwnershipRepository>,

    /// Optional sender for the statistics events.
    stats_event_sender: Arc<Option<Box<dyn EventSender>>>,
}

impl RequestHandler {
    #[must_use]
    pub fn new(
        ownership_repository: &Arc<InMemoryOwnershipRepository>,
        stats_event_sender: &Arc<Option<Box<dyn EventSender>>>,
    ) -> Self {
        Self {
            ownership_repository: ownership_repository.clone(),
            stats_event_sender: stats_event_sender.clone(),
        }
    }

    pub fn handle_connection(&self, peer: &PeerAddress) {
        tracing::debug!(%peer, "peer connected");

        self.send_stats_event(Event::Connection);
    }

    /// Applies a request from `peer` to the registry.
    pub fn handle_request(&self, peer: &PeerAddress, request: TrackerRequest) -> Reply {
        match request {
            TrackerRequest::Store(fingerprints) => {
                let added = self.ownership_repository.register(peer, &fingerprints);

                tracing::debug!(%peer, received = fingerprints.len(), added, "store");

                self.send_stats_event(Event::Store {
                    fingerprints: fingerprints.len(),
                });

                Reply::Nothing
            }
            TrackerRequest::Create(fingerprint) => {
                self.ownership_repository.register_one(peer, &fingerprint);

                tracing::debug!(%peer, %fingerprint, "create");

                self.send_stats_event(Event::Create);

                Reply::Nothing
            }
            TrackerRequest::Delete(fingerprint) => {
                self.ownership_repository.unregister_one(peer, &fingerprint);

                tracing::debug!(%peer, %fingerprint, "delete");

                self.send_stats_event(Event::Delete);

                Reply::Nothing
            }
            TrackerRequest::Query(fingerprint) => {
                let peers = self.ownership_repository.query(&fingerprint);

                tracing::debug!(%peer, %fingerprint, owners = peers.len(), "query");

                self.send_stats_event(Event::Query);

                Reply::Peers(peers)
            }
        }
    }

    pub fn handle_unknown_request(&self, peer: &PeerAddress, kind: &str) {
        tracing::warn!(%peer, kind, "unknown request kind, ignoring it");

        self.send_stats_event(Event::UnknownRequest);
    }

    /// Counts a malformed message. The caller closes the connection, which
    /// must then be reported with [`handle_disconnection`](Self::handle_disconnection).
    pub fn handle_decode_error(&self, peer: &PeerAddress, error: &swarmshare_wire_protocol::DecodeError) {
        tracing::warn!(%peer, %error, "malformed message, closing the connection");

        self.send_stats_event(Event::DecodeError);
    }

    /// Releases every fingerprint owned by `peer`. It must be called exactly
    /// once per closed connection.
    ///
    /// It returns the number of released fingerprints.
    pub fn handle_disconnection(&self, peer: &PeerAddress) -> usize {
        let released = self.ownership_repository.cleanup(peer);

        tracing::debug!(%peer, released, "peer disconnected");

        self.send_stats_event(Event::Disconnection);

        released
    }

    fn send_stats_event(&self, event: Event) {
        if let Some(stats_event_sender) = self.stats_event_sender.as_deref() {
            if let Some(Err(err)) = stats_event_sender.send_event(event) {
                tracing::warn!("unable to send statistics event: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {

    mod the_request_handler {

        use std::sync::Arc;

        use crate::ownership::repository::in_memory::InMemoryOwnershipRepository;
        use crate::request_handler::RequestHandler;
        use crate::statistics::event::sender::EventSender;

        fn initialize_handler() -> (RequestHandler, Arc<InMemoryOwnershipRepository>) {
            let ownership_repository = Arc::new(InMemoryOwnershipRepository::default());
            let stats_event_sender: Arc<Option<Box<dyn EventSender>>> = Arc::new(None);

            (
                RequestHandler::new(&ownership_repository, &stats_event_sender),
                ownership_repository,
            )
        }

        mod handling_requests {

            use swarmshare_primitives::Fingerprint;
            use swarmshare_wire_protocol::TrackerRequest;

            use super::initialize_handler;
            use crate::request_handler::Reply;
            use crate::test_helpers::tests::{sample_peer, sample_peer_two};

            #[test]
            fn it_should_register_the_stored_fingerprints_for_the_requesting_peer() {
                let (handler, repository) = initialize_handler();

                let reply = handler.handle_request(
                    &sample_peer(),
                    TrackerRequest::Store(vec![Fingerprint::new(1), Fingerprint::new(2)]),
                );

                assert_eq!(reply, Reply::Nothing);
                assert_eq!(repository.fingerprints_of(&sample_peer()).len(), 2);
            }

            #[test]
            fn it_should_answer_a_query_with_every_owner() {
                let (handler, _repository) = initialize_handler();
                handler.handle_request(&sample_peer(), TrackerRequest::Create(Fingerprint::new(42)));
                handler.handle_request(&sample_peer_two(), TrackerRequest::Create(Fingerprint::new(42)));

                let reply = handler.handle_request(&sample_peer(), TrackerRequest::Query(Fingerprint::new(42)));

                let Reply::Peers(peers) = reply else {
                    panic!("a query should be answered with a list of peers");
                };
                assert_eq!(peers.len(), 2);
                assert!(peers.contains(&sample_peer()));
                assert!(peers.contains(&sample_peer_two()));
            }

            #[test]
            fn it_should_answer_a_query_for_an_unknown_fingerprint_with_no_peers() {
                let (handler, _repository) = initialize_handler();

                let reply = handler.handle_request(&sample_peer(), TrackerRequest::Query(Fingerprint::new(7)));

                assert_eq!(reply, Reply::Peers(vec![]));
            }

            #[test]
            fn it_should_unregister_a_deleted_fingerprint() {
                let (handler, repository) = initialize_handler();
                handler.handle_request(&sample_peer(), TrackerRequest::Create(Fingerprint::new(42)));

                handler.handle_request(&sample_peer(), TrackerRequest::Delete(Fingerprint::new(42)));

                assert!(repository.query(&Fingerprint::new(42)).is_empty());
            }
        }

        mod handling_disconnections {

            use swarmshare_primitives::Fingerprint;
            use swarmshare_wire_protocol::TrackerRequest;

            use super::initialize_handler;
            use crate::test_helpers::tests::{sample_peer, sample_peer_two};

            #[test]
            fn it_should_release_everything_the_peer_advertised() {
                let (handler, repository) = initialize_handler();
                handler.handle_request(
                    &sample_peer(),
                    TrackerRequest::Store(vec![Fingerprint::new(1), Fingerprint::new(2)]),
                );
                handler.handle_request(&sample_peer_two(), TrackerRequest::Create(Fingerprint::new(2)));

                let released = handler.handle_disconnection(&sample_peer());

                assert_eq!(released, 2);
                assert!(repository.query(&Fingerprint::new(1)).is_empty());
                assert_eq!(repository.query(&Fingerprint::new(2)), vec![sample_peer_two()]);
            }
        }

        mod sending_statistics_events {

            use std::sync::Arc;

            use mockall::predicate::eq;
            use swarmshare_primitives::Fingerprint;
            use swarmshare_wire_protocol::{DecodeError, TrackerRequest};

            use crate::ownership::repository::in_memory::InMemoryOwnershipRepository;
            use crate::request_handler::RequestHandler;
            use crate::statistics;
            use crate::statistics::event::sender::EventSender;
            use crate::test_helpers::tests::sample_peer;

            fn handler_with(stats_event_sender_mock: statistics::event::sender::MockEventSender) -> RequestHandler {
                let stats_event_sender: Arc<Option<Box<dyn EventSender>>> =
                    Arc::new(Some(Box::new(stats_event_sender_mock)));

                RequestHandler::new(&Arc::new(InMemoryOwnershipRepository::default()), &stats_event_sender)
            }

            #[test]
            fn it_should_send_a_store_event_with_the_number_of_fingerprints() {
                let mut stats_event_sender_mock = statistics::event::sender::MockEventSender::new();
                stats_event_sender_mock
                    .expect_send_event()
                    .with(eq(statistics::event::Event::Store { fingerprints: 3 }))
                    .times(1)
                    .returning(|_| Some(Ok(())));

                let handler = handler_with(stats_event_sender_mock);

                handler.handle_request(
                    &sample_peer(),
                    TrackerRequest::Store(vec![Fingerprint::new(1), Fingerprint::new(2), Fingerprint::new(3)]),
                );
            }

            #[test]
            fn it_should_send_a_query_event() {
                let mut stats_event_sender_mock = statistics::event::sender::MockEventSender::new();
                stats_event_sender_mock
                    .expect_send_event()
                    .with(eq(statistics::event::Event::Query))
                    .times(1)
                    .returning(|_| Some(Ok(())));

                let handler = handler_with(stats_event_sender_mock);

                handler.handle_request(&sample_peer(), TrackerRequest::Query(Fingerprint::new(1)));
            }

            #[test]
            fn it_should_send_an_event_for_each_session_boundary() {
                let mut stats_event_sender_mock = statistics::event::sender::MockEventSender::new();
                stats_event_sender_mock
                    .expect_send_event()
                    .with(eq(statistics::event::Event::Connection))
                    .times(1)
                    .returning(|_| Some(Ok(())));
                stats_event_sender_mock
                    .expect_send_event()
                    .with(eq(statistics::event::Event::Disconnection))
                    .times(1)
                    .returning(|_| Some(Ok(())));

                let handler = handler_with(stats_event_sender_mock);

                handler.handle_connection(&sample_peer());
                handler.handle_disconnection(&sample_peer());
            }

            #[test]
            fn it_should_send_an_event_for_malformed_and_unknown_requests() {
                let mut stats_event_sender_mock = statistics::event::sender::MockEventSender::new();
                stats_event_sender_mock
                    .expect_send_event()
                    .with(eq(statistics::event::Event::UnknownRequest))
                    .times(1)
                    .returning(|_| Some(Ok(())));
                stats_event_sender_mock
                    .expect_send_event()
                    .with(eq(statistics::event::Event::DecodeError))
                    .times(1)
                    .returning(|_| Some(Ok(())));

                let handler = handler_with(stats_event_sender_mock);

                handler.handle_unknown_request(&sample_peer(), "frobnicate");
                handler.handle_decode_error(&sample_peer(), &DecodeError::InvalidUtf8);
            }
        }
    }
}
