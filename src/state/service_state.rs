//! # Observable service state.
//!
//! ```text
//! Off ──start──► On ──RUNNING/TRAFFIC──► Launched::Running
//!                 ▲                         │
//!                 │        ┌────────────────┼──────────────────┐
//!                 │        ▼                ▼                  ▼
//!                 └── Launched::LowBattery  Launched::Error   (stop) ──► Off
//! ```

use std::fmt;

use crate::error::ServiceError;

/// Exhaustive list of sharing states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceState {
    /// Not running.
    #[default]
    Off,
    /// Routine requested, not yet confirmed running.
    On,
    /// Routine was launched; see [`Launched`] for the concrete condition.
    Launched(Launched),
}

/// States reachable once the routine has been launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launched {
    /// Confirmed active, with the last reported traffic counter (bytes written).
    Running {
        /// Bytes written as last reported by the routine, if any.
        traffic_bytes: Option<u64>,
    },
    /// Suspended by the battery policy.
    LowBattery,
    /// Suspended because of a reported failure.
    Error(ServiceError),
}

impl ServiceState {
    /// `Launched::Running` with an optional traffic counter.
    pub fn running(traffic_bytes: Option<u64>) -> Self {
        ServiceState::Launched(Launched::Running { traffic_bytes })
    }

    /// `Launched::LowBattery`.
    pub fn low_battery() -> Self {
        ServiceState::Launched(Launched::LowBattery)
    }

    /// `Launched::Error(err)`.
    pub fn error(err: ServiceError) -> Self {
        ServiceState::Launched(Launched::Error(err))
    }

    /// True for every state except [`ServiceState::Off`].
    pub fn is_on(&self) -> bool {
        !matches!(self, ServiceState::Off)
    }

    /// True for `Launched::Running`.
    pub fn is_running(&self) -> bool {
        matches!(self, ServiceState::Launched(Launched::Running { .. }))
    }

    /// Error carried by `Launched::Error`, if any.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            ServiceState::Launched(Launched::Error(err)) => Some(err),
            _ => None,
        }
    }

    /// Short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceState::Off => "off",
            ServiceState::On => "on",
            ServiceState::Launched(Launched::Running { .. }) => "running",
            ServiceState::Launched(Launched::LowBattery) => "low_battery",
            ServiceState::Launched(Launched::Error(_)) => "error",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Launched(Launched::Running {
                traffic_bytes: Some(bytes),
            }) => write!(f, "running({bytes})"),
            ServiceState::Launched(Launched::Error(err)) => write!(f, "error({err})"),
            other => f.write_str(other.as_label()),
        }
    }
}
