//! Starts the tracker and the peer agent from the configuration.
use swarmshare_configuration::Configuration;

use crate::agent::{self, PeerAgent};
use crate::container::TrackerContainer;
use crate::servers::{self, RunningServer};

/// Starts the tracker server.
///
/// # Errors
///
/// Will return an error if the tracker can not bind its address.
pub async fn start_tracker(configuration: &Configuration) -> Result<(TrackerContainer, RunningServer), servers::Error> {
    let container = TrackerContainer::initialize(configuration);

    let server = servers::tracker::start(
        configuration.tracker.bind_address,
        &container.request_handler,
        configuration.network.max_field_size,
    )
    .await?;

    Ok((container, server))
}

/// Starts a peer agent registered with `tracker_address`.
///
/// # Errors
///
/// Will return an error if the agent can not start.
pub async fn start_peer(configuration: &Configuration, tracker_address: &str) -> Result<PeerAgent, agent::Error> {
    PeerAgent::start(tracker_address, &configuration.peer, &configuration.network).await
}
