use tokio::sync::mpsc;

use super::event::listener::dispatch_events;
use super::event::sender::{EventSender, Sender};
use super::event::Event;
use super::repository::Repository;

const CHANNEL_BUFFER_SIZE: usize = 65_535;

/// The service responsible for keeping tracker metrics (listening to
/// statistics events and handle them).
///
/// It actively listen to new statistics events. When it receives a new event
/// it accordingly increases the counters.
pub struct Keeper {
    pub repository: Repository,
}

impl Default for Keeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Keeper {
    #[must_use]
    pub fn new() -> Self {
        Self {
            repository: Repository::new(),
        }
    }

    /// It must be called from inside a tokio runtime.
    pub fn run_event_listener(&mut self) -> Box<dyn EventSender> {
        let (sender, receiver) = mpsc::channel::<Event>(CHANNEL_BUFFER_SIZE);

        let stats_repository = self.repository.clone();

        tokio::spawn(async move { dispatch_events(receiver, stats_repository).await });

        Box::new(Sender { sender })
    }
}

#[cfg(test)]
mod tests {
    use crate::statistics::event::Event;
    use crate::statistics::keeper::Keeper;
    use crate::statistics::metrics::Metrics;

    #[tokio::test]
    async fn should_contain_the_tracker_statistics() {
        let stats_tracker = Keeper::new();

        let stats = stats_tracker.repository.get_stats().await;

        assert_eq!(stats.connections_handled, Metrics::default().connections_handled);
    }

    #[tokio::test]
    async fn should_create_an_event_sender_to_send_statistical_events() {
        let mut stats_tracker = Keeper::new();

        let event_sender = stats_tracker.run_event_listener();

        let result = event_sender.send_event(Event::Connection);

        assert!(matches!(result, Some(Ok(()))));
    }

    #[tokio::test]
    async fn should_apply_the_events_sent_to_the_repository() {
        let mut stats_tracker = Keeper::new();
        let event_sender = stats_tracker.run_event_listener();
        let repository = stats_tracker.repository;

        event_sender.send_event(Event::Query);
        event_sender.send_event(Event::Query);
        drop(event_sender);

        // Give the listener task a chance to drain the channel.
        for _ in 0..100 {
            if repository.get_stats().await.queries_handled == 2 {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(repository.get_stats().await.queries_handled, 2);
    }
}
