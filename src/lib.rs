//! # sharevisor
//!
//! **Sharevisor** supervises a long-running internet sharing routine on an
//! end-user device.
//!
//! It starts, monitors, restarts and stops the routine, classifies the
//! failures it reports, backs off after critical ones, keeps the foreground
//! and background run modes mutually exclusive, and exposes one observable
//! [`ServiceState`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  Supervisor::start(Foreground)         Supervisor::start(Background)
//!            │                                      │
//!            ▼                                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - Registry (one actor per started mode, ModeArbiter)             │
//! │  - StateBroadcaster (current state, streams, listeners)           │
//! │  - Bus + SubscriberSet (diagnostic events)                        │
//! │  - RoutineClient (single owner of the sharing routine)            │
//! └──────┬───────────────────────────────────────────┬────────────────┘
//!        ▼                                           ▼
//!  ┌───────────────────┐                       ┌───────────────────┐
//!  │ ModeActor (fg)    │                       │ ModeActor (bg)    │
//!  │  health task ─┐   │                       │  health task ─┐   │
//!  │  retry task ──┤   │                       │  retry task ──┤   │
//!  │  routine cb ──┴─► inbox                   │  routine cb ──┴─► inbox
//!  └──────┬────────────┘                       └──────┬────────────┘
//!         │ ServiceState                              │ ServiceState
//!         ▼                                           ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │ StateBroadcaster ──► state() streams, StateListener workers        │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle of one mode
//! ```text
//! start ──► wake lock (fg) ──► On ──► health tick (immediate, then periodic)
//!
//! health tick:
//!   ├─ battery < threshold & !charging ─► stop routine, LowBattery
//!   ├─ VPN active                        ─► stop routine, Error(Critical VPN), failures = 0
//!   └─ start allowed                     ─► start routine (idempotent), On
//!
//! routine event (current start only):
//!   ├─ VPN active                        ─► as above
//!   ├─ not_running + Critical            ─► stop routine, Error, failures += 1,
//!   │                                       sleep RetryPolicy::next_delay(failures), start again
//!   ├─ running / traffic                 ─► Running(bytes), failures = 0
//!   ├─ not_running + General/Unknown     ─► Error
//!   └─ otherwise                         ─► On
//!
//! stop ──► cancel timers ──► stop routine ──► Off ──► release wake lock
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                               |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------------|
//! | **Supervision**   | Start/stop run modes, observe state.                          | [`Supervisor`], [`SupervisorBuilder`]            |
//! | **State**         | Observable state machine.                                     | [`ServiceState`], [`StateStream`], [`StateListener`] |
//! | **Collaborators** | Routine, environment and wake-lock boundaries.                | [`SharingRoutine`], [`EnvironmentProbe`], [`WakeLock`] |
//! | **Classification**| Routine event decoding and error taxonomy.                    | [`LifecycleEvent`], [`ServiceError`]             |
//! | **Policies**      | Backoff after critical failures.                              | [`RetryPolicy`], [`JitterPolicy`]                |
//! | **Subscriber API**| Hook into diagnostic events (logging, metrics).               | [`Subscribe`], [`Event`]                         |
//! | **Configuration** | Centralize runtime settings.                                  | [`Config`], [`ModeConfig`]                       |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a `tracing`-backed subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use sharevisor::{
//!     Config, EventCallback, RoutineError, RunMode, ServiceState, SharingRoutine, StaticProbe,
//!     SupervisorBuilder,
//! };
//!
//! struct Native;
//!
//! impl SharingRoutine for Native {
//!     fn initialize(&self, _id: &str, _name: &str) -> Result<(), RoutineError> {
//!         Ok(())
//!     }
//!     fn start(&self, _key: &str, on_event: EventCallback) {
//!         on_event(r#"{"name":"traffic","parameters":{"bytes_written":"1024"}}"#.into());
//!     }
//!     fn stop(&self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = SupervisorBuilder::new(Config::default())
//!         .api_key("api-key")
//!         .routine(Arc::new(Native))
//!         .probe(Arc::new(StaticProbe::default()))
//!         .build();
//!
//!     let mut states = sup.state();
//!     sup.start(RunMode::Foreground).await?;
//!     while let Some(state) = states.recv().await {
//!         if state == ServiceState::running(Some(1024)) {
//!             break;
//!         }
//!     }
//!     sup.stop(RunMode::Foreground).await?;
//!     assert_eq!(sup.state_snapshot(), ServiceState::Off);
//!     Ok(())
//! }
//! ```
mod classify;
mod config;
mod core;
mod device;
mod env;
mod error;
mod events;
mod policies;
mod routine;
mod state;
mod subscribers;

// ---- Public re-exports ----

pub use classify::{
    LifecycleEvent, LifecycleName, VPN_REASON, Verdict, classify, error_for_code, vpn_error,
};
pub use config::{Config, ModeConfig};
pub use self::core::{ModeArbiter, Supervisor, SupervisorBuilder};
pub use device::{DeviceIdentity, INSTALLATION_FILE};
pub use env::{
    BatteryStatus, EnvironmentProbe, NoopWakeLock, StaticProbe, SysfsProbe, WakeLock,
    WakeLockGuard,
};
pub use error::{ClassifyError, InitError, RoutineError, ServiceError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use policies::{Growth, JitterPolicy, RetryPolicy};
pub use routine::{EventCallback, RoutineClient, SharingRoutine};
pub use state::{
    Launched, ListenerFn, ListenerId, RunMode, ServiceState, StateBroadcaster, StateListener,
    StateStream,
};
pub use subscribers::{DEFAULT_QUEUE_CAPACITY, Subscribe, SubscriberSet};

// Optional: expose a tracing-backed logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
