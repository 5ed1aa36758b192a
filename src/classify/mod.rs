//! # Routine event classification.
//!
//! The sharing routine reports its lifecycle as small JSON payloads:
//! ```text
//! { "name": "not_running", "parameters": { "error": "unauthorized" } }
//! ```
//! [`LifecycleEvent::parse`] decodes them and [`classify`] turns them into a
//! [`Verdict`] the mode actor acts upon.

mod classifier;
mod event;

pub use classifier::{VPN_REASON, Verdict, classify, error_for_code, vpn_error};
pub use event::{LifecycleEvent, LifecycleName};
