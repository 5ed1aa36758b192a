//! # ModeActor: single-mode state machine.
//!
//! Owns everything one run mode decides: when to start and stop the sharing
//! routine, how to react to its lifecycle events, and when to retry after a
//! critical failure.
//!
//! ## Architecture
//! ```text
//!   health task ──HealthTick──┐
//!   retry task ───RetryDue────┤
//!   routine cb ───RoutineEvent┼──► [inbox] ──► ModeActor::handle()
//!   Registry ─────Stop────────┘                    │
//!                                                  ├─► StateBroadcaster.publish(ServiceState)
//!                                                  ├─► RoutineClient.start/stop
//!                                                  └─► Bus.publish(Event)
//! ```
//!
//! ## Rules
//! - Commands are handled **one at a time**, in arrival order
//! - Routine events from an older start (or after a stop) are **ignored**
//! - At most **one** retry is pending; scheduling a new one cancels the old
//! - Only the mode owning the routine (or any mode while it is idle) writes
//!   the shared state; a refused mode stays silent
//! - The wake lock is held only while no other mode owns the routine
//! - Teardown releases the wake lock and publishes `Off` when allowed to

use std::sync::Arc;

use tokio::{select, sync::mpsc};
use tokio_util::sync::CancellationToken;

use crate::classify::{LifecycleEvent, Verdict, classify, vpn_error};
use crate::config::Config;
use crate::core::{health, retry};
use crate::env::{EnvironmentProbe, WakeLock, WakeLockGuard};
use crate::error::ServiceError;
use crate::events::{Bus, Event, EventKind};
use crate::routine::{EventCallback, RoutineClient};
use crate::state::{RunMode, ServiceState, StateBroadcaster};

/// Messages processed by a [`ModeActor`].
#[derive(Debug)]
pub(crate) enum Command {
    /// Periodic battery/VPN check.
    HealthTick,
    /// Backoff elapsed for the retry with this id.
    RetryDue { id: u64 },
    /// Raw event from the routine start numbered `generation`.
    RoutineEvent { generation: u64, raw: String },
    /// Tear the mode down.
    Stop,
}

/// Collaborators shared by every mode actor.
#[derive(Clone)]
pub(crate) struct ActorContext {
    pub cfg: Arc<Config>,
    pub api_key: Arc<str>,
    pub routine: Arc<RoutineClient>,
    pub probe: Arc<dyn EnvironmentProbe>,
    pub wake_lock: Arc<dyn WakeLock>,
    pub state: Arc<StateBroadcaster>,
    pub bus: Bus,
}

struct PendingRetry {
    id: u64,
    token: CancellationToken,
}

/// Drives one run mode until stopped or cancelled.
pub(crate) struct ModeActor {
    mode: RunMode,
    ctx: ActorContext,
    tx: mpsc::UnboundedSender<Command>,
    rx: mpsc::UnboundedReceiver<Command>,

    wake_lock: Option<WakeLockGuard>,
    /// Generation of the routine start currently sharing.
    sharing: Option<u64>,
    generation: u64,
    /// Cleared while a backoff is pending.
    start_allowed: bool,
    /// Consecutive critical failures.
    failures: u32,
    retry: Option<PendingRetry>,
    next_retry_id: u64,
}

impl ModeActor {
    /// Creates the actor and the sender feeding its inbox.
    pub fn new(mode: RunMode, ctx: ActorContext) -> (Self, mpsc::UnboundedSender<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = Self {
            mode,
            ctx,
            tx: tx.clone(),
            rx,
            wake_lock: None,
            sharing: None,
            generation: 0,
            start_allowed: true,
            failures: 0,
            retry: None,
            next_retry_id: 0,
        };
        (actor, tx)
    }

    /// Runs until a [`Command::Stop`] arrives or `session` is cancelled.
    pub async fn run(mut self, session: CancellationToken) {
        self.begin(&session);

        loop {
            select! {
                biased;
                _ = session.cancelled() => break,
                cmd = self.rx.recv() => match cmd {
                    Some(Command::Stop) | None => break,
                    Some(cmd) => self.handle(cmd, &session),
                }
            }
        }

        self.teardown(&session);
    }

    fn begin(&mut self, session: &CancellationToken) {
        let interval = self.ctx.cfg.mode(self.mode).health_interval_clamped();
        if self.owns_state() {
            self.hold_wake_lock();
            self.ctx.state.publish(ServiceState::On);
        } else {
            tracing::debug!(mode = %self.mode, "routine owned by another mode, state left alone");
        }
        self.ctx
            .bus
            .publish(Event::new(EventKind::ServiceStarted).with_mode(self.mode));
        tracing::info!(mode = %self.mode, "started service");

        health::spawn(interval, self.tx.clone(), session.child_token());
    }

    fn handle(&mut self, cmd: Command, session: &CancellationToken) {
        match cmd {
            Command::HealthTick => self.on_health_tick(),
            Command::RetryDue { id } => self.on_retry_due(id),
            Command::RoutineEvent { generation, raw } => {
                self.on_routine_event(generation, &raw, session)
            }
            Command::Stop => {}
        }
    }

    fn on_health_tick(&mut self) {
        let battery = self.ctx.probe.battery();
        if battery.is_low(self.ctx.cfg.low_battery_threshold) {
            tracing::info!(mode = %self.mode, level = battery.level, "low battery, suspending sharing");
            self.ctx.bus.publish(
                Event::new(EventKind::LowBattery)
                    .with_mode(self.mode)
                    .with_reason(format!("{}%", battery.level)),
            );
            self.stop_sharing(ServiceState::low_battery());
        } else if self.ctx.probe.is_vpn_active() {
            self.suspend_for_vpn();
        } else if self.start_allowed {
            self.start_sharing();
        } else {
            tracing::debug!(mode = %self.mode, "backoff pending, start deferred");
        }
    }

    fn on_retry_due(&mut self, id: u64) {
        match &self.retry {
            Some(pending) if pending.id == id => {}
            _ => {
                tracing::debug!(mode = %self.mode, id, "stale retry ignored");
                return;
            }
        }
        self.retry = None;
        self.start_allowed = true;
        tracing::info!(mode = %self.mode, failures = self.failures, "retrying after backoff");
        self.ctx.bus.publish(
            Event::new(EventKind::RetryFired)
                .with_mode(self.mode)
                .with_failures(self.failures),
        );
        self.start_sharing();
    }

    fn on_routine_event(&mut self, generation: u64, raw: &str, session: &CancellationToken) {
        if self.sharing != Some(generation) {
            tracing::trace!(mode = %self.mode, generation, "event from stopped routine ignored");
            return;
        }
        let event = match LifecycleEvent::parse(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(mode = %self.mode, error = %e, "dropping routine event");
                self.ctx.bus.publish(
                    Event::new(EventKind::EventDropped)
                        .with_mode(self.mode)
                        .with_reason(e.to_string()),
                );
                return;
            }
        };
        let vpn = self.ctx.probe.is_vpn_active();
        tracing::debug!(
            mode = %self.mode,
            name = event.name.map(|n| n.as_str()),
            error = event.error_code(),
            traffic = event.traffic_value.as_deref(),
            "routine event"
        );

        match classify(&event, vpn) {
            Verdict::Critical(err) => self.schedule_retry(err, session),
            Verdict::Vpn => self.suspend_for_vpn(),
            Verdict::Publish {
                state,
                confirms_running,
            } => {
                if confirms_running {
                    self.failures = 0;
                }
                self.publish_state(state);
            }
        }
    }

    fn suspend_for_vpn(&mut self) {
        tracing::info!(mode = %self.mode, "vpn detected, suspending sharing");
        self.failures = 0;
        self.ctx
            .bus
            .publish(Event::new(EventKind::VpnDetected).with_mode(self.mode));
        self.stop_sharing(ServiceState::error(vpn_error()));
    }

    /// Stop, wait out the backoff, then start again.
    fn schedule_retry(&mut self, err: ServiceError, session: &CancellationToken) {
        self.start_allowed = false;
        let reason = err.reason().unwrap_or_default().to_string();
        self.stop_sharing(ServiceState::error(err));

        self.failures = self.failures.saturating_add(1);
        let delay = self.ctx.cfg.mode(self.mode).retry.next_delay(self.failures);

        if let Some(old) = self.retry.take() {
            old.token.cancel();
        }
        self.next_retry_id += 1;
        let id = self.next_retry_id;
        let token = session.child_token();
        retry::spawn(id, delay, self.tx.clone(), token.clone());
        self.retry = Some(PendingRetry { id, token });

        tracing::warn!(
            mode = %self.mode,
            failures = self.failures,
            delay_ms = delay.as_millis() as u64,
            reason = %reason,
            "critical error, backing off"
        );
        self.ctx.bus.publish(
            Event::new(EventKind::BackoffScheduled)
                .with_mode(self.mode)
                .with_failures(self.failures)
                .with_delay(delay)
                .with_reason(reason),
        );
    }

    fn start_sharing(&mut self) {
        if self.sharing.is_some() {
            return;
        }
        let generation = self.generation + 1;
        let tx = self.tx.clone();
        let on_event: EventCallback = Box::new(move |raw| {
            let _ = tx.send(Command::RoutineEvent { generation, raw });
        });

        match self
            .ctx
            .routine
            .start(self.mode, &self.ctx.api_key, on_event)
        {
            Ok(()) => {
                self.generation = generation;
                self.sharing = Some(generation);
                self.hold_wake_lock();
                self.ctx.state.publish(ServiceState::On);
                tracing::info!(mode = %self.mode, generation, "started sharing");
                self.ctx.bus.publish(
                    Event::new(EventKind::SharingStarted)
                        .with_mode(self.mode)
                        .with_attempt(generation),
                );
            }
            Err(e) => {
                tracing::warn!(mode = %self.mode, error = %e, "sharing start refused");
                self.ctx.bus.publish(
                    Event::new(EventKind::SharingRefused)
                        .with_mode(self.mode)
                        .with_reason(e.to_string()),
                );
            }
        }
    }

    /// True when the routine is idle or driven by this mode.
    fn owns_state(&self) -> bool {
        self.ctx.routine.owner().is_none_or(|m| m == self.mode)
    }

    fn publish_state(&self, state: ServiceState) {
        if self.owns_state() {
            self.ctx.state.publish(state);
        } else {
            tracing::debug!(mode = %self.mode, state = %state, "not the routine owner, state dropped");
        }
    }

    fn hold_wake_lock(&mut self) {
        if self.wake_lock.is_none() && self.ctx.cfg.mode(self.mode).hold_wake_lock {
            self.wake_lock = Some(WakeLockGuard::acquire(Arc::clone(&self.ctx.wake_lock)));
        }
    }

    fn stop_sharing(&mut self, state: ServiceState) {
        // checked before `stop`, which clears the owner
        self.publish_state(state.clone());
        let was_sharing = self.sharing.take().is_some();
        self.ctx.routine.stop(self.mode);
        if was_sharing {
            tracing::info!(mode = %self.mode, state = %state, "stopped sharing");
            self.ctx.bus.publish(
                Event::new(EventKind::SharingStopped)
                    .with_mode(self.mode)
                    .with_state(state),
            );
        }
    }

    fn teardown(&mut self, session: &CancellationToken) {
        session.cancel();
        self.retry = None;
        self.stop_sharing(ServiceState::Off);
        if let Some(lock) = self.wake_lock.take() {
            lock.release();
        }
        self.failures = 0;
        self.ctx
            .bus
            .publish(Event::new(EventKind::ServiceStopped).with_mode(self.mode));
        tracing::info!(mode = %self.mode, "stopped service");
    }
}
