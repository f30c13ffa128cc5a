use mockall::automock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::Event;

/// A trait to allow sending statistics events.
///
/// Sending never waits: when the channel is full the event is dropped and the
/// error is returned to the caller.
#[automock]
pub trait EventSender: Sync + Send {
    fn send_event(&self, event: Event) -> Option<Result<(), TrySendError<Event>>>;
}

/// An [`statistics::EventSender`](crate::statistics::event::sender::EventSender)
/// implementation.
///
/// It uses a channel sender to send the statistic events. The channel is
/// created by a [`statistics::Keeper`](crate::statistics::keeper::Keeper).
#[allow(clippy::module_name_repetitions)]
pub struct Sender {
    pub(crate) sender: mpsc::Sender<Event>,
}

impl EventSender for Sender {
    fn send_event(&self, event: Event) -> Option<Result<(), TrySendError<Event>>> {
        Some(self.sender.try_send(event))
    }
}
