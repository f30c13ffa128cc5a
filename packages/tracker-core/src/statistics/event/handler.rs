use crate::statistics::event::Event;
use crate::statistics::repository::Repository;

pub async fn handle_event(event: Event, stats_repository: &Repository) {
    match event {
        // Sessions
        Event::Connection => {
            stats_repository.increase_connections().await;
        }
        Event::Disconnection => {
            stats_repository.increase_disconnections().await;
        }

        // Requests
        Event::Store { fingerprints } => {
            stats_repository.increase_stores(fingerprints).await;
        }
        Event::Create => {
            stats_repository.increase_creates().await;
        }
        Event::Delete => {
            stats_repository.increase_deletes().await;
        }
        Event::Query => {
            stats_repository.increase_queries().await;
        }

        // Errors
        Event::UnknownRequest => {
            stats_repository.increase_unknown_requests().await;
        }
        Event::DecodeError => {
            stats_repository.increase_decode_errors().await;
        }
    }

    tracing::debug!("stats: {:?}", stats_repository.get_stats().await);
}
