//! # Runtime configuration.
//!
//! Provides [`Config`] centralized settings for the supervisor and
//! [`ModeConfig`] per-run-mode settings.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `health_interval = 0s` → clamped to 1ms

use std::time::Duration;

use crate::policies::RetryPolicy;
use crate::state::RunMode;

/// Settings for one run mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeConfig {
    /// Period of the battery/VPN health check. The first check runs immediately.
    pub health_interval: Duration,

    /// Delay policy after critical failures.
    pub retry: RetryPolicy,

    /// Hold the device wake lock while the mode is started.
    pub hold_wake_lock: bool,
}

impl ModeConfig {
    /// Foreground defaults: 5 min checks, growing backoff, wake lock held.
    pub fn foreground() -> Self {
        Self {
            health_interval: Duration::from_secs(5 * 60),
            retry: RetryPolicy::foreground(),
            hold_wake_lock: true,
        }
    }

    /// Background defaults: 2 min checks, flat backoff, no wake lock.
    pub fn background() -> Self {
        Self {
            health_interval: Duration::from_secs(2 * 60),
            retry: RetryPolicy::background(),
            hold_wake_lock: false,
        }
    }

    /// Health interval clamped to a minimum of 1ms.
    #[inline]
    pub fn health_interval_clamped(&self) -> Duration {
        self.health_interval.max(Duration::from_millis(1))
    }
}

/// Global configuration for the supervisor.
///
/// ## Field semantics
/// - `foreground` / `background`: per-mode settings, see [`ModeConfig`]
/// - `low_battery_threshold`: percent below which a discharging device suspends sharing
/// - `bus_capacity`: diagnostic event bus ring buffer size (min 1)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over reading sentinels directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Foreground mode settings.
    pub foreground: ModeConfig,

    /// Background mode settings.
    pub background: ModeConfig,

    /// Battery percent below which sharing is suspended (when not charging).
    pub low_battery_threshold: u8,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Subscribers lagging more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,
}

impl Config {
    /// Settings for `mode`.
    pub fn mode(&self, mode: RunMode) -> &ModeConfig {
        match mode {
            RunMode::Foreground => &self.foreground,
            RunMode::Background => &self.background,
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - foreground: 5 min health checks, linear 30s..300s backoff plus 1-10s jitter
    /// - background: 2 min health checks, flat 30s backoff
    /// - `low_battery_threshold = 20`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            foreground: ModeConfig::foreground(),
            background: ModeConfig::background(),
            low_battery_threshold: 20,
            bus_capacity: 1024,
        }
    }
}
