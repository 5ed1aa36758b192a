//! # LogWriter: tracing-backed event writer
//!
//! A subscriber that turns every [`Event`] into a `tracing` record under the
//! `sharevisor` target. Install any `tracing` subscriber to see them.
//!
//! ## Example output
//! ```text
//! INFO sharevisor: service started mode=foreground
//! INFO sharevisor: sharing started mode=foreground attempt=1
//! WARN sharevisor: backoff scheduled mode=foreground failures=1 delay_ms=36211 reason="ApiKey is incorrect or expired"
//! INFO sharevisor: retry fired mode=foreground failures=1
//! INFO sharevisor: service stopped mode=foreground
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let mode = e.mode.map(|m| m.as_str()).unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::ServiceStarted => {
                tracing::info!(target: "sharevisor", mode, "service started");
            }
            EventKind::ServiceStopped => {
                tracing::info!(target: "sharevisor", mode, "service stopped");
            }
            EventKind::ModeYielded => {
                tracing::info!(target: "sharevisor", mode, reason, "mode yielded");
            }
            EventKind::SharingStarted => {
                tracing::info!(target: "sharevisor", mode, attempt = ?e.attempt, "sharing started");
            }
            EventKind::SharingStopped => {
                let state = e.state.as_ref().map(|s| s.to_string()).unwrap_or_default();
                tracing::info!(target: "sharevisor", mode, state, "sharing stopped");
            }
            EventKind::SharingRefused => {
                tracing::warn!(target: "sharevisor", mode, reason, "sharing refused");
            }
            EventKind::EventDropped => {
                tracing::warn!(target: "sharevisor", mode, reason, "routine event dropped");
            }
            EventKind::LowBattery => {
                tracing::info!(target: "sharevisor", mode, reason, "low battery");
            }
            EventKind::VpnDetected => {
                tracing::info!(target: "sharevisor", mode, "vpn detected");
            }
            EventKind::BackoffScheduled => {
                tracing::warn!(
                    target: "sharevisor",
                    mode,
                    failures = ?e.failures,
                    delay_ms = ?e.delay_ms,
                    reason,
                    "backoff scheduled"
                );
            }
            EventKind::RetryFired => {
                tracing::info!(target: "sharevisor", mode, failures = ?e.failures, "retry fired");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "sharevisor", reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: "sharevisor", reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
