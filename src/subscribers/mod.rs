//! # Event subscribers.
//!
//! ## Architecture
//! ```text
//! ModeActor ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet::emit
//!                                                                   ├──► LogWriter
//!                                                                   ├──► Metrics
//!                                                                   └──► Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use sharevisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct RetryCounter;
//!
//! #[async_trait]
//! impl Subscribe for RetryCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::BackoffScheduled {
//!             // increment counter
//!         }
//!     }
//!     fn name(&self) -> &'static str { "retry-counter" }
//! }
//! ```

mod guard;
#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use guard::guarded;
pub use set::SubscriberSet;
pub use subscribe::{DEFAULT_QUEUE_CAPACITY, Subscribe};
