//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] adds randomness on top of a computed retry delay so that
//! devices recovering from the same upstream failure do not reconnect in lockstep.
//!
//! - [`JitterPolicy::None`] no randomization, predictable delays
//! - [`JitterPolicy::Additive`] adds a uniform random amount in `[min, max]`

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// No jitter: use the exact delay.
    #[default]
    None,

    /// Additive jitter: `delay + random[min, max]`.
    ///
    /// Never shortens the delay.
    Additive {
        /// Lower bound of the extra wait.
        min: Duration,
        /// Upper bound of the extra wait (inclusive).
        max: Duration,
    },
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match *self {
            JitterPolicy::None => delay,
            JitterPolicy::Additive { min, max } => delay.saturating_add(Self::pick(min, max)),
        }
    }

    /// Uniform pick in `[min, max]` with millisecond resolution.
    fn pick(min: Duration, max: Duration) -> Duration {
        let lo = min.as_millis() as u64;
        let hi = max.as_millis() as u64;
        if hi <= lo {
            return Duration::from_millis(lo);
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}
