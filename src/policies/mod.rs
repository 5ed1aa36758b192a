//! # Policies controlling recovery timing.
//!
//! - [`RetryPolicy`] delay after a critical failure, by failure count;
//! - [`Growth`] linear or fixed delay growth;
//! - [`JitterPolicy`] randomization added on top of the delay.

mod jitter;
mod retry;

pub use jitter::JitterPolicy;
pub use retry::{Growth, RetryPolicy};
