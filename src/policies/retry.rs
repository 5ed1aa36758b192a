//! # Retry policy for critical failures.
//!
//! [`RetryPolicy`] decides how long a mode waits after a critical failure before
//! it is allowed to start sharing again. It is parameterized by:
//! - [`RetryPolicy::base`] the delay for the first failure;
//! - [`RetryPolicy::max`] the cap applied before jitter;
//! - [`RetryPolicy::growth`] how the delay grows with repeated failures;
//! - [`RetryPolicy::jitter`] randomness added on top.
//!
//! The delay for failure count `n` is `grow(base, max(n, 1))`, clamped to `max`,
//! then jitter is applied. The base is derived purely from the failure count, so
//! jitter never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use sharevisor::{Growth, JitterPolicy, RetryPolicy};
//!
//! let retry = RetryPolicy {
//!     base: Duration::from_secs(30),
//!     max: Duration::from_secs(300),
//!     growth: Growth::Linear,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(retry.next_delay(0), Duration::from_secs(30));
//! assert_eq!(retry.next_delay(3), Duration::from_secs(90));
//! assert_eq!(retry.next_delay(50), Duration::from_secs(300));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// How the delay grows with the failure count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Growth {
    /// `base × n`.
    Linear,
    /// Always `base`.
    Fixed,
}

/// Critical-failure retry policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay for the first failure.
    pub base: Duration,
    /// Cap applied before jitter.
    pub max: Duration,
    /// Growth with the failure count.
    pub growth: Growth,
    /// Jitter added after capping.
    pub jitter: JitterPolicy,
}

impl Default for RetryPolicy {
    /// Same as [`RetryPolicy::foreground`].
    fn default() -> Self {
        Self::foreground()
    }
}

impl RetryPolicy {
    /// Foreground preset: linear 30s steps up to 5 min, plus 1-10s of jitter.
    pub fn foreground() -> Self {
        Self {
            base: Duration::from_secs(30),
            max: Duration::from_secs(300),
            growth: Growth::Linear,
            jitter: JitterPolicy::Additive {
                min: Duration::from_millis(1000),
                max: Duration::from_millis(10_000),
            },
        }
    }

    /// Background preset: a flat 30s, no jitter.
    pub fn background() -> Self {
        Self {
            base: Duration::from_secs(30),
            max: Duration::from_secs(30),
            growth: Growth::Fixed,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay after `failures` consecutive critical failures.
    ///
    /// A count of zero is treated as one.
    pub fn next_delay(&self, failures: u32) -> Duration {
        let n = failures.max(1);
        let grown = match self.growth {
            Growth::Linear => self.base.checked_mul(n).unwrap_or(self.max),
            Growth::Fixed => self.base,
        };
        self.jitter.apply(grown.min(self.max))
    }
}
