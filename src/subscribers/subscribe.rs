//! Hook for consumers of supervisor diagnostics.
//!
//! Diagnostics are lossy by nature: a subscriber that cannot keep up loses
//! events from its own lane and the rest of the supervisor carries on. Code
//! that must not miss a transition should observe the service state through
//! [`Supervisor::state`](crate::Supervisor::state) instead.

use async_trait::async_trait;

use crate::events::Event;

/// Lane size used when a subscriber does not pick one.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Receives supervisor diagnostics on a dedicated worker task.
///
/// `on_event` may await I/O; it only delays this subscriber's lane. A panic
/// is caught and reported as [`EventKind::SubscriberPanicked`](crate::EventKind::SubscriberPanicked).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    async fn on_event(&self, event: &Event);

    /// Label used in logs and in overflow/panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events buffered for this subscriber before new ones are dropped.
    fn queue_capacity(&self) -> usize {
        DEFAULT_QUEUE_CAPACITY
    }
}
