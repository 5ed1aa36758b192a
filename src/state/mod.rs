//! Observable state: data model, broadcaster and listeners.
//!
//! ## Contents
//! - [`ServiceState`], [`Launched`] the sharing state machine's states
//! - [`RunMode`] foreground vs background
//! - [`StateBroadcaster`], [`StateStream`] ordered push delivery plus snapshots
//! - [`StateListener`], [`ListenerFn`] callback-style observation

mod broadcaster;
mod listener;
mod mode;
mod service_state;

pub use broadcaster::{ListenerId, StateBroadcaster, StateStream};
pub use listener::{ListenerFn, StateListener};
pub use mode::RunMode;
pub use service_state::{Launched, ServiceState};
