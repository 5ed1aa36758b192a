//! Runtime core: mode actors and their orchestration.
//!
//! The public API from this module is [`Supervisor`], [`SupervisorBuilder`]
//! and [`ModeArbiter`].
//!
//! Internal modules:
//! - [`actor`]: one run mode's state machine;
//! - [`registry`]: table of started modes, start/stop/shutdown;
//! - [`health`]: periodic battery/VPN check driver;
//! - [`retry`]: one-shot backoff timer.

mod actor;
mod arbiter;
mod builder;
mod health;
mod registry;
mod retry;
mod supervisor;

pub use arbiter::ModeArbiter;
pub use builder::SupervisorBuilder;
pub use supervisor::Supervisor;
