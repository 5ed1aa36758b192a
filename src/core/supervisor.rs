//! # Supervisor: public entry point for running the sharing routine.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the
//! [`StateBroadcaster`] and the table of started modes. Each started
//! [`RunMode`] is driven by its own actor.
//!
//! ## High-level architecture
//! ```text
//! SupervisorBuilder::build()
//!   ├─ RoutineClient::initialize(device)  → initialization result kept
//!   ├─ subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   └─ Registry (modes table, runtime_token)
//!
//! start(mode) ──► Registry ──► ModeActor::run(session token)
//!                                  ├─► health task  (child token) ──► HealthTick
//!                                  ├─► retry task   (child token) ──► RetryDue
//!                                  └─► routine cb   ───────────────► RoutineEvent
//!
//! ModeActor ── publish(ServiceState) ──► StateBroadcaster ──► state() streams / listeners
//!           ── publish(Event) ─────────► Bus ──► SubscriberSet ──► subscribers
//!
//! shutdown() ──► runtime_token.cancel() → every session token → actors tear down
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use sharevisor::{
//!     Config, EventCallback, RoutineError, RunMode, SharingRoutine, StaticProbe, SupervisorBuilder,
//! };
//!
//! struct Quiet;
//!
//! impl SharingRoutine for Quiet {
//!     fn initialize(&self, _: &str, _: &str) -> Result<(), RoutineError> { Ok(()) }
//!     fn start(&self, _: &str, on_event: EventCallback) {
//!         on_event(r#"{"name":"running"}"#.to_string());
//!     }
//!     fn stop(&self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = SupervisorBuilder::new(Config::default())
//!         .api_key("my-key")
//!         .routine(Arc::new(Quiet))
//!         .probe(Arc::new(StaticProbe::default()))
//!         .build();
//!
//!     let mut states = sup.state();
//!     sup.start(RunMode::Background).await?;
//!     while let Some(state) = states.recv().await {
//!         if state.is_running() {
//!             break;
//!         }
//!     }
//!     sup.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    core::registry::Registry,
    error::{InitError, SupervisorError},
    events::{Bus, Event},
    state::{ListenerId, RunMode, ServiceState, StateBroadcaster, StateListener, StateStream},
    subscribers::SubscriberSet,
};

/// Starts, stops and observes the run modes of the sharing routine.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    state: Arc<StateBroadcaster>,
    registry: Registry,
    initialization: Result<(), InitError>,
    runtime_token: CancellationToken,
}

impl Supervisor {
    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        state: Arc<StateBroadcaster>,
        registry: Registry,
        initialization: Result<(), InitError>,
        runtime_token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            bus,
            subs,
            state,
            registry,
            initialization,
            runtime_token,
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
    pub(crate) fn subscriber_listener(&self) {
        if self.subs.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "subscriber listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    fn ensure_initialized(&self, op: &'static str) -> Result<(), SupervisorError> {
        self.initialization.clone().map_err(|e| {
            tracing::warn!(op, error = %e, "supervisor is not initialized");
            SupervisorError::NotInitialized(e)
        })
    }

    /// Starts `mode`. A no-op if it already runs.
    ///
    /// Starting [`RunMode::Background`] stops [`RunMode::Foreground`] first.
    ///
    /// # Errors
    /// - [`SupervisorError::NotInitialized`] when the build failed to initialize
    /// - [`SupervisorError::ShutDown`] after [`Supervisor::shutdown`]
    pub async fn start(&self, mode: RunMode) -> Result<(), SupervisorError> {
        self.ensure_initialized("start")?;
        self.registry.start(mode).await
    }

    /// Stops `mode` and waits until it published `Off`. Idempotent.
    ///
    /// # Errors
    /// - [`SupervisorError::NotInitialized`] when the build failed to initialize
    /// - [`SupervisorError::ActorGone`] when the mode's actor had died
    pub async fn stop(&self, mode: RunMode) -> Result<(), SupervisorError> {
        self.ensure_initialized("stop")?;
        self.registry.stop(mode).await
    }

    /// True while `mode` is started.
    pub async fn is_active(&self, mode: RunMode) -> bool {
        if self.ensure_initialized("is_active").is_err() {
            return false;
        }
        self.registry.is_active(mode).await
    }

    /// Current state; `Off` when not initialized.
    pub fn state_snapshot(&self) -> ServiceState {
        if self.ensure_initialized("state_snapshot").is_err() {
            return ServiceState::Off;
        }
        self.state.snapshot()
    }

    /// Stream of state transitions, starting with the current state.
    ///
    /// When not initialized, yields `Off` and ends.
    pub fn state(&self) -> StateStream {
        if self.ensure_initialized("state").is_err() {
            return StateStream::once(ServiceState::Off);
        }
        self.state.subscribe()
    }

    /// Registers a listener called on every state transition.
    ///
    /// The listener is first called with the current state.
    pub fn register_listener(
        &self,
        listener: Arc<dyn StateListener>,
    ) -> Result<ListenerId, SupervisorError> {
        self.ensure_initialized("register_listener")?;
        Ok(self.state.register_listener(listener))
    }

    /// Removes one listener. Returns whether it was registered.
    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        if self.ensure_initialized("unregister_listener").is_err() {
            return false;
        }
        self.state.unregister_listener(id)
    }

    /// Removes every listener. A no-op when not initialized.
    pub fn clear_listeners(&self) {
        if self.ensure_initialized("clear_listeners").is_ok() {
            self.state.clear_listeners();
        }
    }

    /// Outcome of initialization at build time.
    pub fn initialization(&self) -> Result<(), InitError> {
        self.initialization.clone()
    }

    /// Subscribes to diagnostic events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Configuration this supervisor runs with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Stops every mode and refuses further starts.
    pub async fn shutdown(&self) {
        tracing::info!("supervisor shutting down");
        self.runtime_token.cancel();
        self.registry.cancel_all().await;
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}
