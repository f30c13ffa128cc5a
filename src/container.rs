use std::sync::Arc;

use swarmshare_configuration::Configuration;
use swarmshare_tracker_core::ownership::repository::in_memory::InMemoryOwnershipRepository;
use swarmshare_tracker_core::request_handler::RequestHandler;
use swarmshare_tracker_core::statistics;
use swarmshare_tracker_core::statistics::repository::Repository;

/// The tracker services, wired together.
pub struct TrackerContainer {
    pub ownership_repository: Arc<InMemoryOwnershipRepository>,
    pub request_handler: Arc<RequestHandler>,
    pub stats_repository: Repository,
}

impl TrackerContainer {
    /// It must be called from inside a tokio runtime when statistics are
    /// enabled.
    #[must_use]
    pub fn initialize(configuration: &Configuration) -> Self {
        let (stats_event_sender, stats_repository) = statistics::setup::factory(configuration.tracker.statistics);
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
