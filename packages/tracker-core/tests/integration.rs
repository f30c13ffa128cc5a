use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use swarmshare_primitives::{Fingerprint, PeerAddress};
use swarmshare_tracker_core::ownership::repository::in_memory::InMemoryOwnershipRepository;
use swarmshare_tracker_core::ownership::RegistryMetrics;
use swarmshare_tracker_core::request_handler::{Reply, RequestHandler};
use swarmshare_tracker_core::statistics;
use swarmshare_tracker_core::statistics::repository::Repository;
use swarmshare_wire_protocol::TrackerRequest;

// The remote address of a peer connection.
#[must_use]
fn peer(last_octet: u8, port: u16) -> PeerAddress {
    SocketAddr::new(
        IpAddr::V4(Ipv4Addr::from_str(&format!("126.0.0.{last_octet}")).unwrap()),
        port,
    )
}

struct Container {
    pub ownership_repository: Arc<InMemoryOwnershipRepository>,
    pub request_handler: Arc<RequestHandler>,
    pub stats_repository: Repository,
}

impl Container {
    pub fn initialize(tracker_usage_statistics: bool) -> Self {
        let (stats_event_sender, stats_repository) = statistics::setup::factory(tracker_usage_statistics);
        let stats_event_sender = Arc::new(stats_event_sender);
        let ownership_repository = Arc::new(InMemoryOwnershipRepository::default());
        let request_handler = Arc::new(RequestHandler::new(&ownership_repository, &stats_event_sender));

        Self {
            ownership_repository,
            request_handler,
            stats_repository,
        }
    }
}

fn owners(reply: Reply) -> Vec<PeerAddress> {
    match reply {
        Reply::Peers(peers) => peers,
        Reply::Nothing => panic!("a query should be answered with a list of peers"),
    }
}

#[tokio::test]
async fn test_two_peers_sharing_the_same_content() {
    let container = Container::initialize(false);

    let first = peer(1, 40001);
    let second = peer(2, 40002);

    container
        .request_handler
        .handle_request(&first, TrackerRequest::Store(vec![Fingerprint::new(42)]));
    container
        .request_handler
        .handle_request(&second, TrackerRequest::Store(vec![Fingerprint::new(42)]));

    let peers = owners(
        container
            .request_handler
            .handle_request(&first, TrackerRequest::Query(Fingerprint::new(42))),
    );

    assert_eq!(peers.len(), 2);
    assert!(peers.contains(&first));
    assert!(peers.contains(&second));
}

#[tokio::test]
async fn test_a_disconnected_peer_is_no_longer_returned() {
    let container = Container::initialize(false);

    let leaving = peer(1, 40001);
    let staying = peer(2, 40002);

    container.request_handler.handle_connection(&leaving);
    container.request_handler.handle_request(
        &leaving,
        TrackerRequest::Store(vec![Fingerprint::new(1), Fingerprint::new(2)]),
    );
    container.request_handler.handle_connection(&staying);
    container
        .request_handler
        .handle_request(&staying, TrackerRequest::Create(Fingerprint::new(2)));

    container.request_handler.handle_disconnection(&leaving);

    assert_eq!(
        owners(
            container
                .request_handler
                .handle_request(&staying, TrackerRequest::Query(Fingerprint::new(2)))
        ),
        vec![staying]
    );
    assert!(owners(
        container
            .request_handler
            .handle_request(&staying, TrackerRequest::Query(Fingerprint::new(1)))
    )
    .is_empty());
    assert!(container.ownership_repository.fingerprints_of(&leaving).is_empty());
    assert_eq!(container.ownership_repository.metrics(), RegistryMetrics::new(1, 1, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_the_registry_stays_consistent_under_concurrent_sessions() {
    let container = Container::initialize(false);

    let mut sessions = tokio::task::JoinSet::new();

    for index in 0..16u16 {
        let request_handler = container.request_handler.clone();

        sessions.spawn(async move {
            let address = peer(1, 41000 + index);

            request_handler.handle_connection(&address);

            for round in 0..50u64 {
                request_handler.handle_request(
                    &address,
                    TrackerRequest::Store(vec![Fingerprint::new(round % 7), Fingerprint::new(100)]),
                );
                request_handler.handle_request(&address, TrackerRequest::Delete(Fingerprint::new(round % 5)));
                request_handler.handle_request(&address, TrackerRequest::Query(Fingerprint::new(100)));
                tokio::task::yield_now().await;
            }

            if index % 2 == 0 {
                request_handler.handle_disconnection(&address);
            }
        });
    }

    while let Some(result) = sessions.join_next().await {
        result.unwrap();
    }

    assert!(container.ownership_repository.is_consistent());
    assert_eq!(container.ownership_repository.query(&Fingerprint::new(100)).len(), 8);

    for index in (0..16u16).step_by(2) {
        let left = peer(1, 41000 + index);

        assert!(container.ownership_repository.fingerprints_of(&left).is_empty());
        for fingerprint in (0..7).chain([100]) {
            assert!(!container
                .ownership_repository
                .query(&Fingerprint::new(fingerprint))
                .contains(&left));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_fingerprint_is_released_when_all_the_sessions_close_at_once() {
    let container = Container::initialize(false);

    let mut sessions = tokio::task::JoinSet::new();

    for index in 0..32u16 {
        let request_handler = container.request_handler.clone();

        sessions.spawn(async move {
            let address = peer(2, 42000 + index);

            request_handler.handle_connection(&address);
            request_handler.handle_request(
                &address,
                TrackerRequest::Store((0..20).map(Fingerprint::new).collect()),
            );
            tokio::task::yield_now().await;
            request_handler.handle_request(&address, TrackerRequest::Create(Fingerprint::new(1000 + u64::from(index))));
            tokio::task::yield_now().await;

            request_handler.handle_disconnection(&address)
        });
    }

    while let Some(result) = sessions.join_next().await {
        assert_eq!(result.unwrap(), 21);
    }

    assert!(container.ownership_repository.is_consistent());
    assert_eq!(container.ownership_repository.metrics(), RegistryMetrics::new(0, 0, 0));
}

#[tokio::test]
async fn test_the_tracker_statistics_are_collected() {
    let container = Container::initialize(true);

    let address = peer(1, 40001);

    container.request_handler.handle_connection(&address);
    container
        .request_handler
        .handle_request(&address, TrackerRequest::Store(vec![Fingerprint::new(1), Fingerprint::new(2)]));
    container
        .request_handler
        .handle_request(&address, TrackerRequest::Query(Fingerprint::new(1)));
    container.request_handler.handle_disconnection(&address);

    // The events are applied by a background task.
    for _ in 0..100 {
        if container.stats_repository.get_stats().await.connections_closed == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }

    let stats = container.stats_repository.get_stats().await;

    assert_eq!(stats.connections_handled, 1);
    assert_eq!(stats.stores_handled, 1);
    assert_eq!(stats.fingerprints_stored, 2);
    assert_eq!(stats.queries_handled, 1);
    assert_eq!(stats.connections_closed, 1);
}
