//! # Diagnostic events emitted by the supervisor and its mode actors.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! (mode, reason, delay, failure count, resulting state).
//!
//! State transitions themselves are delivered by the
//! [`StateBroadcaster`](crate::StateBroadcaster); these events describe the
//! *decisions* behind them (why sharing stopped, when the next retry fires, ...).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use sharevisor::{Event, EventKind, RunMode};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_mode(RunMode::Foreground)
//!     .with_reason("ApiKey is incorrect or expired")
//!     .with_failures(2)
//!     .with_delay(Duration::from_secs(65));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.delay_ms, Some(65_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::state::{RunMode, ServiceState};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Mode lifecycle ===
    /// A mode actor was started.
    ///
    /// Sets: `mode`
    ServiceStarted,

    /// A mode actor was stopped (explicitly or on supervisor shutdown).
    ///
    /// Sets: `mode`
    ServiceStopped,

    /// A mode was stopped to let a conflicting mode start.
    ///
    /// Sets: `mode` (the mode that yielded), `reason`
    ModeYielded,

    // === Sharing routine ===
    /// The sharing routine was started.
    ///
    /// Sets: `mode`, `attempt` (routine generation)
    SharingStarted,

    /// The sharing routine was stopped.
    ///
    /// Sets: `mode`, `state` (state emitted alongside)
    SharingStopped,

    /// The routine refused to start (owned by another mode).
    ///
    /// Sets: `mode`, `reason`
    SharingRefused,

    /// A routine event could not be parsed and was dropped.
    ///
    /// Sets: `mode`, `reason`
    EventDropped,

    // === Health checks ===
    /// Battery below threshold while not charging.
    ///
    /// Sets: `mode`, `reason` (level)
    LowBattery,

    /// A competing VPN was detected.
    ///
    /// Sets: `mode`
    VpnDetected,

    // === Recovery ===
    /// A critical failure stopped sharing and a retry was scheduled.
    ///
    /// Sets: `mode`, `reason`, `failures`, `delay_ms`
    BackoffScheduled,

    /// A scheduled retry fired and sharing is being restarted.
    ///
    /// Sets: `mode`, `failures`
    RetryFired,

    // === Subscribers ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `reason` (subscriber name + panic info)
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason`
    SubscriberOverflow,
}

/// Supervisor event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Run mode the event refers to.
    pub mode: Option<RunMode>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
    /// Retry delay in milliseconds.
    pub delay_ms: Option<u64>,
    /// Consecutive critical failures at the time of the event.
    pub failures: Option<u32>,
    /// Routine start generation.
    pub attempt: Option<u64>,
    /// State emitted together with this event.
    pub state: Option<ServiceState>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            mode: None,
            reason: None,
            delay_ms: None,
            failures: None,
            attempt: None,
            state: None,
        }
    }

    /// Attaches a run mode.
    #[inline]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches the consecutive failure count.
    #[inline]
    pub fn with_failures(mut self, n: u32) -> Self {
        self.failures = Some(n);
        self
    }

    /// Attaches the routine generation.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches the emitted state.
    #[inline]
    pub fn with_state(mut self, state: ServiceState) -> Self {
        self.state = Some(state);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}
