//! Maps decoded routine events to service states.

use crate::classify::event::{LifecycleEvent, LifecycleName};
use crate::error::ServiceError;
use crate::state::ServiceState;

/// Reason reported while a competing VPN blocks sharing.
pub const VPN_REASON: &str = "VPN is not allowed, waiting on VPN to be disabled";

/// The critical error reported while a VPN is active.
pub fn vpn_error() -> ServiceError {
    ServiceError::critical(VPN_REASON)
}

/// Maps a routine error code to a [`ServiceError`].
///
/// Blank codes map to `None`; unrecognized codes are kept verbatim as
/// [`ServiceError::Unknown`].
pub fn error_for_code(code: &str) -> Option<ServiceError> {
    let code = code.trim();
    let err = match code {
        "" => return None,
        "cant_get_free_port" => ServiceError::critical("Unable to open port"),
        "non_residential_ip" => {
            ServiceError::critical("IP address is not suitable for internet sharing")
        }
        "unsupported_version" => {
            ServiceError::critical("Library version is too old and is no longer supported")
        }
        "unauthorized" => ServiceError::critical("ApiKey is incorrect or expired"),
        "lost_connection" => ServiceError::general("Lost connection"),
        "ip_used" => ServiceError::general("This IP is already in use"),
        "could_not_mark_peer_alive" => ServiceError::general("Internal error"),
        "cant_open_port" => ServiceError::general("Unable to open port"),
        other => ServiceError::unknown(Some(other.to_string())),
    };
    Some(err)
}

/// Outcome of classifying one routine event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A competing VPN is active; suspend sharing.
    Vpn,
    /// The routine stopped with a critical error; back off before retrying.
    Critical(ServiceError),
    /// Publish the state as-is.
    Publish {
        /// State to publish.
        state: ServiceState,
        /// True when the event confirms the routine is relaying.
        confirms_running: bool,
    },
}

/// Classifies a decoded event.
///
/// A VPN observed while handling the event overrides whatever the routine
/// reported.
pub fn classify(event: &LifecycleEvent, vpn_active: bool) -> Verdict {
    if vpn_active {
        return Verdict::Vpn;
    }
    let error = event.error_code().and_then(error_for_code);

    match (event.name, error) {
        (Some(LifecycleName::NotRunning), Some(err)) if err.is_critical() => Verdict::Critical(err),
        (Some(LifecycleName::NotRunning), Some(err)) => Verdict::Publish {
            state: ServiceState::error(err),
            confirms_running: false,
        },
        (Some(name), _) if name.is_running() => Verdict::Publish {
            state: ServiceState::running(event.traffic_bytes()),
            confirms_running: true,
        },
        // starting, not_running without error, unknown names
        _ => Verdict::Publish {
            state: ServiceState::On,
            confirms_running: false,
        },
    }
}
