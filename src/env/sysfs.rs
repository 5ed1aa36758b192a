//! Linux probe backed by `/sys/class`.
//!
//! ```text
//! /sys/class/power_supply/BAT0/{type,capacity,status}
//! /sys/class/net/{tun0,wg0,...}
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::env::probe::{BatteryStatus, EnvironmentProbe};

/// Interface name prefixes treated as VPN tunnels.
const VPN_PREFIXES: &[&str] = &["tun", "tap", "wg", "ppp", "ipsec"];

/// Reads battery and interface state from sysfs.
#[derive(Debug, Clone)]
pub struct SysfsProbe {
    root: PathBuf,
}

impl Default for SysfsProbe {
    fn default() -> Self {
        Self::with_root("/sys")
    }
}

impl SysfsProbe {
    /// Probe rooted at `/sys`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe rooted elsewhere (containers, tests).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_trimmed(path: &Path) -> Option<String> {
        fs::read_to_string(path).ok().map(|s| s.trim().to_string())
    }

    fn read_battery(&self) -> Option<BatteryStatus> {
        let dir = fs::read_dir(self.root.join("class/power_supply")).ok()?;
        for entry in dir.flatten() {
            let path = entry.path();
            if Self::read_trimmed(&path.join("type")).as_deref() != Some("Battery") {
                continue;
            }
            let Some(level) = Self::read_trimmed(&path.join("capacity"))
                .and_then(|s| s.parse::<u8>().ok())
            else {
                continue;
            };
            let status = Self::read_trimmed(&path.join("status")).unwrap_or_default();
            return Some(BatteryStatus {
                level: level.min(100),
                charging: matches!(status.as_str(), "Charging" | "Full"),
            });
        }
        None
    }
}

impl EnvironmentProbe for SysfsProbe {
    fn battery(&self) -> BatteryStatus {
        self.read_battery().unwrap_or(BatteryStatus::MAINS)
    }

    fn is_vpn_active(&self) -> bool {
        let Ok(dir) = fs::read_dir(self.root.join("class/net")) else {
            return false;
        };
        dir.flatten().any(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            VPN_PREFIXES.iter().any(|p| name.starts_with(p))
        })
    }
}
