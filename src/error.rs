//! Error types used by the sharevisor runtime and its collaborators.
//!
//! This module defines:
//!
//! - [`ServiceError`] the failure taxonomy observed by callers through
//!   [`ServiceState`](crate::ServiceState).
//! - [`SupervisorError`] errors returned by the public supervisor API.
//! - [`InitError`] why a supervisor failed to initialize.
//! - [`RoutineError`] errors raised at the sharing routine boundary.
//! - [`ClassifyError`] a routine event payload could not be parsed.
//!
//! Errors that end up in logs provide `as_label` helpers returning stable
//! snake_case labels.

use thiserror::Error;

use crate::RunMode;

/// # Failure reported by the sharing routine (or the environment).
///
/// Carried by [`Launched::Error`](crate::Launched::Error).
/// Only [`ServiceError::Critical`] triggers the stop-and-backoff path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Sharing cannot currently succeed; the supervisor backs off before retrying.
    #[error("critical: {reason}")]
    Critical {
        /// Human-readable reason.
        reason: String,
    },

    /// Transient failure, reported without a dedicated recovery path.
    #[error("general: {reason}")]
    General {
        /// Human-readable reason.
        reason: String,
    },

    /// Unrecognized error code, preserved verbatim.
    #[error("unknown: {}", reason.as_deref().unwrap_or("<none>"))]
    Unknown {
        /// Raw error code as reported by the routine.
        reason: Option<String>,
    },
}

impl ServiceError {
    /// Creates a [`ServiceError::Critical`].
    pub fn critical(reason: impl Into<String>) -> Self {
        ServiceError::Critical {
            reason: reason.into(),
        }
    }

    /// Creates a [`ServiceError::General`].
    pub fn general(reason: impl Into<String>) -> Self {
        ServiceError::General {
            reason: reason.into(),
        }
    }

    /// Creates a [`ServiceError::Unknown`].
    pub fn unknown(reason: Option<String>) -> Self {
        ServiceError::Unknown { reason }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sharevisor::ServiceError;
    ///
    /// let err = ServiceError::critical("ApiKey is incorrect or expired");
    /// assert_eq!(err.as_label(), "service_critical");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Critical { .. } => "service_critical",
            ServiceError::General { .. } => "service_general",
            ServiceError::Unknown { .. } => "service_unknown",
        }
    }

    /// Returns the reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ServiceError::Critical { reason } | ServiceError::General { reason } => Some(reason),
            ServiceError::Unknown { reason } => reason.as_deref(),
        }
    }

    /// True for [`ServiceError::Critical`].
    pub fn is_critical(&self) -> bool {
        matches!(self, ServiceError::Critical { .. })
    }
}

/// # Why a supervisor is not initialized.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// The API key was never provided or is blank.
    #[error("api key has not been provided")]
    MissingApiKey,

    /// No sharing routine was configured.
    #[error("sharing routine has not been provided")]
    MissingRoutine,

    /// The sharing routine refused initialization.
    #[error("sharing routine failed to initialize: {0}")]
    Routine(#[from] RoutineError),
}

/// # Errors produced by the public supervisor API.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    /// The supervisor was built without a successful initialization.
    #[error("supervisor is not initialized: {0}")]
    NotInitialized(InitError),

    /// The mode actor died instead of stopping cleanly.
    #[error("{mode} actor is gone")]
    ActorGone {
        /// Mode whose actor vanished.
        mode: RunMode,
    },

    /// [`Supervisor::shutdown`](crate::Supervisor::shutdown) already ran.
    #[error("supervisor is shut down")]
    ShutDown,
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::NotInitialized(_) => "supervisor_not_initialized",
            SupervisorError::ActorGone { .. } => "supervisor_actor_gone",
            SupervisorError::ShutDown => "supervisor_shut_down",
        }
    }
}

/// # Errors raised at the sharing routine boundary.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutineError {
    /// Another run mode currently owns the process-wide routine.
    #[error("sharing routine is owned by {owner}")]
    Busy {
        /// Mode holding the routine.
        owner: RunMode,
    },

    /// The native side failed to initialize.
    #[error("initialize failed: {reason}")]
    Initialize {
        /// Reason reported by the routine.
        reason: String,
    },
}

/// # A raw routine event could not be classified.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Payload is not valid event JSON.
    #[error("malformed routine event: {0}")]
    Malformed(#[from] serde_json::Error),
}
