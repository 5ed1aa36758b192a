//! # Device environment collaborators.
//!
//! - [`EnvironmentProbe`] battery and VPN readings consumed by the health loop;
//! - [`StaticProbe`] hand-set readings, [`SysfsProbe`] Linux sysfs readings;
//! - [`WakeLock`] / [`WakeLockGuard`] keep the device awake in foreground mode.

mod probe;
mod sysfs;
mod wake_lock;

pub use probe::{BatteryStatus, EnvironmentProbe, StaticProbe};
pub use sysfs::SysfsProbe;
pub use wake_lock::{NoopWakeLock, WakeLock, WakeLockGuard};
