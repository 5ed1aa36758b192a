//! Environment probing: battery and competing VPNs.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Battery reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    /// Charge level, percent (0-100).
    pub level: u8,
    /// True while plugged in.
    pub charging: bool,
}

impl BatteryStatus {
    /// Reading used when the device has no battery.
    pub const MAINS: BatteryStatus = BatteryStatus {
        level: 100,
        charging: true,
    };

    /// True when below `threshold` percent and not charging.
    pub fn is_low(&self, threshold: u8) -> bool {
        !self.charging && self.level < threshold
    }
}

/// Reports the device conditions the health loop acts upon.
///
/// Called from the mode actors; implementations must not block for long.
pub trait EnvironmentProbe: Send + Sync + 'static {
    /// Current battery reading.
    fn battery(&self) -> BatteryStatus;

    /// True when a VPN other than ours is routing traffic.
    fn is_vpn_active(&self) -> bool;
}

/// Probe with values set by hand.
///
/// Useful for tests and simulated devices; every setter takes effect on the
/// next health tick.
#[derive(Debug)]
pub struct StaticProbe {
    level: AtomicU8,
    charging: AtomicBool,
    vpn: AtomicBool,
}

impl Default for StaticProbe {
    fn default() -> Self {
        Self::new(BatteryStatus::MAINS, false)
    }
}

impl StaticProbe {
    /// Creates a probe with the given initial readings.
    pub fn new(battery: BatteryStatus, vpn: bool) -> Self {
        Self {
            level: AtomicU8::new(battery.level.min(100)),
            charging: AtomicBool::new(battery.charging),
            vpn: AtomicBool::new(vpn),
        }
    }

    /// Replaces the battery reading.
    pub fn set_battery(&self, level: u8, charging: bool) {
        self.level.store(level.min(100), Ordering::Relaxed);
        self.charging.store(charging, Ordering::Relaxed);
    }

    /// Toggles the VPN reading.
    pub fn set_vpn(&self, active: bool) {
        self.vpn.store(active, Ordering::Relaxed);
    }
}

impl EnvironmentProbe for StaticProbe {
    fn battery(&self) -> BatteryStatus {
        BatteryStatus {
            level: self.level.load(Ordering::Relaxed),
            charging: self.charging.load(Ordering::Relaxed),
        }
    }

    fn is_vpn_active(&self) -> bool {
        self.vpn.load(Ordering::Relaxed)
    }
}
