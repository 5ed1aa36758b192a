//! # Sharing routine boundary.
//!
//! The native routine is a process-wide black box with three calls:
//! initialize, start (with a callback) and stop. [`SharingRoutine`] is that
//! contract; [`RoutineClient`] wraps it and records which run mode owns it.
//!
//! ```text
//!  ModeActor ──start(mode)──► RoutineClient ──start(key, cb)──► SharingRoutine
//!      ▲                           │ owner: Option<RunMode>          │
//!      └──── RoutineEvent ◄────────┴──────────── cb(json) ◄─────────┘
//! ```

mod client;

pub use client::RoutineClient;

use crate::error::RoutineError;

/// Callback receiving raw JSON lifecycle events.
///
/// May be invoked from any thread, any number of times.
pub type EventCallback = Box<dyn Fn(String) + Send + Sync + 'static>;

/// Contract of the native sharing routine.
pub trait SharingRoutine: Send + Sync + 'static {
    /// One-time setup with the device identity.
    fn initialize(&self, device_id: &str, device_name: &str) -> Result<(), RoutineError>;

    /// Starts relaying; lifecycle events are reported through `on_event`.
    fn start(&self, api_token: &str, on_event: EventCallback);

    /// Stops relaying. Idempotent.
    fn stop(&self);
}
