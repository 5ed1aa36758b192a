use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{
    actor::ActorContext,
    registry::Registry,
    supervisor::Supervisor,
};
use crate::{
    config::Config,
    device::DeviceIdentity,
    env::{EnvironmentProbe, NoopWakeLock, SysfsProbe, WakeLock},
    error::{InitError, RoutineError},
    events::Bus,
    routine::{EventCallback, RoutineClient, SharingRoutine},
    state::StateBroadcaster,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Supervisor`].
///
/// Only the API key and the routine are mandatory. Missing either one still
/// builds a supervisor, but an uninitialized one: its entry points log and
/// report [`SupervisorError::NotInitialized`](crate::SupervisorError::NotInitialized).
pub struct SupervisorBuilder {
    cfg: Config,
    api_key: Option<String>,
    routine: Option<Arc<dyn SharingRoutine>>,
    probe: Option<Arc<dyn EnvironmentProbe>>,
    wake_lock: Option<Arc<dyn WakeLock>>,
    device: Option<DeviceIdentity>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            api_key: None,
            routine: None,
            probe: None,
            wake_lock: None,
            device: None,
            subscribers: Vec::new(),
        }
    }

    /// API key handed to the routine on every start.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// The native sharing routine.
    pub fn routine(mut self, routine: Arc<dyn SharingRoutine>) -> Self {
        self.routine = Some(routine);
        self
    }

    /// Environment probe. Defaults to [`SysfsProbe`].
    pub fn probe(mut self, probe: Arc<dyn EnvironmentProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Wake lock held by modes with `hold_wake_lock`. Defaults to [`NoopWakeLock`].
    pub fn wake_lock(mut self, lock: Arc<dyn WakeLock>) -> Self {
        self.wake_lock = Some(lock);
        self
    }

    /// Device identity passed to the routine. Defaults to a fresh, unpersisted id.
    pub fn device(mut self, device: DeviceIdentity) -> Self {
        self.device = Some(device);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive diagnostic events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor and initializes the routine.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Supervisor> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        let runtime_token = CancellationToken::new();
        let state = Arc::new(StateBroadcaster::new());

        let device = self
            .device
            .unwrap_or_else(|| DeviceIdentity::ephemeral("unknown-device"));
        let api_key = self.api_key.filter(|k| !k.trim().is_empty());

        let (routine, initialization) = match self.routine {
            Some(routine) => {
                let client = Arc::new(RoutineClient::new(routine));
                let init = match api_key {
                    None => Err(InitError::MissingApiKey),
                    Some(_) => client.initialize(&device).map_err(InitError::from),
                };
                (client, init)
            }
            None => (
                Arc::new(RoutineClient::new(Arc::new(Unset))),
                Err(InitError::MissingRoutine),
            ),
        };
        match &initialization {
            Ok(()) => tracing::info!(device = device.id(), "supervisor initialized"),
            Err(e) => tracing::error!(error = %e, "supervisor not initialized"),
        }

        let ctx = ActorContext {
            cfg: Arc::new(self.cfg.clone()),
            api_key: Arc::from(api_key.unwrap_or_default()),
            routine,
            probe: self.probe.unwrap_or_else(|| Arc::new(SysfsProbe::new())),
            wake_lock: self.wake_lock.unwrap_or_else(|| Arc::new(NoopWakeLock)),
            state: Arc::clone(&state),
            bus: bus.clone(),
        };
        let registry = Registry::new(ctx, runtime_token.clone());

        let sup = Arc::new(Supervisor::new_internal(
            self.cfg,
            bus,
            subs,
            state,
            registry,
            initialization,
            runtime_token,
        ));
        sup.subscriber_listener();
        sup
    }
}

/// Stand-in for a supervisor built without a routine; never started.
struct Unset;

impl SharingRoutine for Unset {
    fn initialize(&self, _: &str, _: &str) -> Result<(), RoutineError> {
        Err(RoutineError::Initialize {
            reason: "no routine".into(),
        })
    }
    fn start(&self, _: &str, _: EventCallback) {}
    fn stop(&self) {}
}
