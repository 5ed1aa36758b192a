//! # Diagnostic bus.
//!
//! Mode actors, the registry and the subscriber lanes all report what they
//! did here. The supervisor forwards the bus into its [`SubscriberSet`]
//! and callers may tap it with [`Supervisor::events`].
//!
//! ```text
//! ModeActor (fg) ─┐
//! ModeActor (bg) ─┼─► Bus ─┬─► subscriber_listener ─► SubscriberSet
//! Registry       ─┘        └─► Supervisor::events() receivers
//! ```
//!
//! Publishing never waits. A receiver that falls more than `capacity`
//! events behind skips the oldest ones (`RecvError::Lagged`). Nothing is
//! kept for receivers that subscribe later. The service state does not
//! travel here: it goes through the [`StateBroadcaster`](crate::StateBroadcaster).
//!
//! [`SubscriberSet`]: crate::SubscriberSet
//! [`Supervisor::events`]: crate::Supervisor::events

use tokio::sync::broadcast;

use super::event::Event;

/// Lossy many-to-many channel for [`Event`]s.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Opens a bus buffering up to `capacity` events per receiver (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Hands `ev` to every current receiver.
    pub fn publish(&self, ev: Event) {
        if let Err(broadcast::error::SendError(ev)) = self.tx.send(ev) {
            tracing::trace!(kind = ?ev.kind, "no diagnostic receivers");
        }
    }

    /// Receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
