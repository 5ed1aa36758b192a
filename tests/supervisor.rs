use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use sharevisor::{
    BatteryStatus, Config, DeviceIdentity, EnvironmentProbe, Event, EventCallback, EventKind,
    Growth, InitError, JitterPolicy, ListenerFn, RetryPolicy, RoutineError, RunMode, ServiceError,
    ServiceState, SharingRoutine, StateStream, StaticProbe, Supervisor, SupervisorBuilder,
    SupervisorError, VPN_REASON, WakeLock,
};
use tokio::sync::broadcast;
use tokio::time::{Instant, timeout};

const UNAUTHORIZED: &str = r#"{"name":"not_running","parameters":{"error":"unauthorized"}}"#;
const LONG: Duration = Duration::from_secs(24 * 3600);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct FakeRoutine {
    starts: AtomicUsize,
    stops: AtomicUsize,
    device: Mutex<Option<(String, String)>>,
    keys: Mutex<Vec<String>>,
    callbacks: Mutex<Vec<EventCallback>>,
    fail_init: bool,
}

impl FakeRoutine {
    fn failing() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Reports an event through the most recent start's callback.
    fn emit(&self, raw: &str) {
        let callbacks = self.callbacks.lock();
        let cb = callbacks.last().expect("routine was never started");
        cb(raw.to_string());
    }

    /// Reports an event through the callback of start number `n` (0-based).
    fn emit_on(&self, n: usize, raw: &str) {
        let callbacks = self.callbacks.lock();
        callbacks[n](raw.to_string());
    }
}

impl SharingRoutine for FakeRoutine {
    fn initialize(&self, device_id: &str, device_name: &str) -> Result<(), RoutineError> {
        if self.fail_init {
            return Err(RoutineError::Initialize {
                reason: "native library missing".into(),
            });
        }
        *self.device.lock() = Some((device_id.into(), device_name.into()));
        Ok(())
    }

    fn start(&self, api_token: &str, on_event: EventCallback) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().push(api_token.to_string());
        self.callbacks.lock().push(on_event);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct CountingLock {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl WakeLock for CountingLock {
    fn acquire(&self) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
    }
    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    sup: Arc<Supervisor>,
    routine: Arc<FakeRoutine>,
    probe: Arc<StaticProbe>,
    lock: Arc<CountingLock>,
    events: broadcast::Receiver<Event>,
    states: StateStream,
}

fn harness(cfg: Config) -> Harness {
    init_tracing();
    let routine = Arc::new(FakeRoutine::default());
    let probe = Arc::new(StaticProbe::default());
    let lock = Arc::new(CountingLock::default());
    let sup = SupervisorBuilder::new(cfg)
        .api_key("test-key")
        .routine(routine.clone())
        .probe(probe.clone())
        .wake_lock(lock.clone())
        .device(DeviceIdentity::new("device-1", "test-device"))
        .build();
    let events = sup.events();
    let states = sup.state();
    Harness {
        sup,
        routine,
        probe,
        lock,
        events,
        states,
    }
}

fn no_jitter() -> Config {
    let mut cfg = Config::default();
    cfg.foreground.retry.jitter = JitterPolicy::None;
    cfg
}

async fn next_state(states: &mut StateStream) -> ServiceState {
    timeout(LONG, states.recv())
        .await
        .expect("timed out waiting for state")
        .expect("state stream ended")
}

async fn wait_state(states: &mut StateStream, want: &ServiceState) {
    loop {
        if &next_state(states).await == want {
            return;
        }
    }
}

async fn wait_event(events: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    timeout(LONG, async {
        loop {
            match events.recv().await {
                Ok(ev) if ev.kind == kind => return ev,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => panic!("bus closed: {e}"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn unauthorized() -> ServiceState {
    ServiceState::error(ServiceError::critical("ApiKey is incorrect or expired"))
}

#[tokio::test(start_paused = true)]
async fn start_is_idempotent() {
    let mut h = harness(Config::default());
    assert_eq!(next_state(&mut h.states).await, ServiceState::Off);

    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    h.sup.start(RunMode::Foreground).await.unwrap();

    h.routine.emit(r#"{"name":"running"}"#);

    assert_eq!(next_state(&mut h.states).await, ServiceState::On);
    assert_eq!(next_state(&mut h.states).await, ServiceState::running(None));
    assert!(h.sup.is_active(RunMode::Foreground).await);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(h.states.try_recv().is_none());
    assert_eq!(h.routine.starts(), 1);
    assert_eq!(h.routine.keys.lock().as_slice(), ["test-key"]);
    assert_eq!(h.lock.acquired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent() {
    let mut h = harness(Config::default());
    h.sup.stop(RunMode::Foreground).await.unwrap();

    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.sup.stop(RunMode::Foreground).await.unwrap();
    h.sup.stop(RunMode::Foreground).await.unwrap();

    assert_eq!(h.sup.state_snapshot(), ServiceState::Off);
    assert!(!h.sup.is_active(RunMode::Foreground).await);
    assert_eq!(h.routine.stops(), 1);
    assert_eq!(h.lock.released.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn traffic_event_reports_running_bytes() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Background).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.routine
        .emit(r#"{"name":"running","parameters":{"bytes_written":"1024"}}"#);
    wait_state(&mut h.states, &ServiceState::running(Some(1024))).await;

    h.routine
        .emit(r#"{"name":"traffic","parameters":{"bytes_written":"oops"}}"#);
    assert_eq!(next_state(&mut h.states).await, ServiceState::running(None));
}

#[tokio::test(start_paused = true)]
async fn unauthorized_backs_off_then_retries() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    let t0 = Instant::now();
    h.routine.emit(UNAUTHORIZED);
    wait_state(&mut h.states, &unauthorized()).await;

    let backoff = wait_event(&mut h.events, EventKind::BackoffScheduled).await;
    assert_eq!(backoff.failures, Some(1));
    let delay = backoff.delay_ms.unwrap();
    assert!((31_000..=40_000).contains(&delay), "delay {delay}");
    assert_eq!(h.routine.stops(), 1);

    wait_event(&mut h.events, EventKind::RetryFired).await;
    assert!(t0.elapsed() >= Duration::from_millis(delay));
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    assert_eq!(h.routine.starts(), 2);
    assert_eq!(next_state(&mut h.states).await, ServiceState::On);
}

#[tokio::test(start_paused = true)]
async fn failures_grow_and_reset_on_running() {
    let mut h = harness(no_jitter());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    let mut delays = Vec::new();
    for _ in 0..2 {
        h.routine.emit(UNAUTHORIZED);
        let ev = wait_event(&mut h.events, EventKind::BackoffScheduled).await;
        delays.push(ev.delay_ms.unwrap());
        wait_event(&mut h.events, EventKind::SharingStarted).await;
    }
    assert_eq!(delays, [30_000, 60_000]);

    h.routine.emit(r#"{"name":"running"}"#);
    h.routine.emit(UNAUTHORIZED);
    let ev = wait_event(&mut h.events, EventKind::BackoffScheduled).await;
    assert_eq!(ev.failures, Some(1));
    assert_eq!(ev.delay_ms, Some(30_000));
}

#[tokio::test(start_paused = true)]
async fn background_backoff_is_flat() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Background).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    for _ in 0..3 {
        h.routine.emit(UNAUTHORIZED);
        let ev = wait_event(&mut h.events, EventKind::BackoffScheduled).await;
        assert_eq!(ev.delay_ms, Some(30_000));
        wait_event(&mut h.events, EventKind::SharingStarted).await;
    }
}

#[tokio::test(start_paused = true)]
async fn general_error_is_reported_without_retry() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.routine
        .emit(r#"{"name":"not_running","parameters":{"error":"lost_connection"}}"#);
    wait_state(
        &mut h.states,
        &ServiceState::error(ServiceError::general("Lost connection")),
    )
    .await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.routine.stops(), 0);
    assert_eq!(h.routine.starts(), 1);
}

#[tokio::test(start_paused = true)]
async fn vpn_overrides_routine_event() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.probe.set_vpn(true);
    h.routine.emit(UNAUTHORIZED);
    let vpn = ServiceState::error(ServiceError::critical(VPN_REASON));
    wait_state(&mut h.states, &vpn).await;
    wait_event(&mut h.events, EventKind::VpnDetected).await;
    assert_eq!(h.routine.stops(), 1);

    // no backoff: the next healthy tick restarts
    h.probe.set_vpn(false);
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    assert_eq!(h.routine.starts(), 2);
    assert_eq!(next_state(&mut h.states).await, ServiceState::On);
}

#[tokio::test(start_paused = true)]
async fn vpn_overrides_running_state() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    h.routine
        .emit(r#"{"name":"running","parameters":{"bytes_written":"64"}}"#);
    wait_state(&mut h.states, &ServiceState::running(Some(64))).await;

    h.probe.set_vpn(true);
    h.routine
        .emit(r#"{"name":"traffic","parameters":{"bytes_written":"128"}}"#);
    let vpn = ServiceState::error(ServiceError::critical(VPN_REASON));
    assert_eq!(next_state(&mut h.states).await, vpn);
    assert_eq!(h.routine.stops(), 1);

    let mut kinds = Vec::new();
    while let Ok(ev) = h.events.try_recv() {
        kinds.push(ev.kind);
    }
    assert!(kinds.contains(&EventKind::VpnDetected));
    assert!(kinds.contains(&EventKind::SharingStopped));
    assert!(!kinds.contains(&EventKind::BackoffScheduled));
}

#[tokio::test(start_paused = true)]
async fn vpn_on_health_tick_suspends() {
    let mut h = harness(Config::default());
    h.probe.set_vpn(true);
    h.sup.start(RunMode::Background).await.unwrap();

    let vpn = ServiceState::error(ServiceError::critical(VPN_REASON));
    wait_state(&mut h.states, &vpn).await;
    assert_eq!(h.routine.starts(), 0);
}

#[tokio::test(start_paused = true)]
async fn low_battery_suspends_and_resumes() {
    let mut h = harness(Config::default());
    h.probe.set_battery(10, false);
    h.sup.start(RunMode::Foreground).await.unwrap();

    wait_state(&mut h.states, &ServiceState::low_battery()).await;
    assert_eq!(h.routine.starts(), 0);

    h.probe.set_battery(80, false);
    let t0 = Instant::now();
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    assert!(t0.elapsed() >= Duration::from_secs(5 * 60) - Duration::from_millis(1));
    assert_eq!(next_state(&mut h.states).await, ServiceState::On);
}

#[tokio::test(start_paused = true)]
async fn charging_ignores_low_level() {
    let mut h = harness(Config::default());
    h.probe.set_battery(5, true);
    h.sup.start(RunMode::Background).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    assert_eq!(h.probe.battery(), BatteryStatus { level: 5, charging: true });
}

#[tokio::test(start_paused = true)]
async fn low_battery_stops_running_routine() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Background).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    h.routine.emit(r#"{"name":"running"}"#);
    wait_state(&mut h.states, &ServiceState::running(None)).await;

    h.probe.set_battery(19, false);
    wait_state(&mut h.states, &ServiceState::low_battery()).await;
    assert_eq!(h.routine.stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn background_start_stops_foreground() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.sup.start(RunMode::Background).await.unwrap();
    let yielded = wait_event(&mut h.events, EventKind::ModeYielded).await;
    assert_eq!(yielded.mode, Some(RunMode::Foreground));

    assert!(!h.sup.is_active(RunMode::Foreground).await);
    assert!(h.sup.is_active(RunMode::Background).await);
    let started = wait_event(&mut h.events, EventKind::SharingStarted).await;
    assert_eq!(started.mode, Some(RunMode::Background));
    assert_eq!(h.routine.starts(), 2);
    assert_eq!(h.routine.stops(), 1);
    assert_eq!(h.lock.released.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn foreground_is_refused_while_background_shares() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Background).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.sup.start(RunMode::Foreground).await.unwrap();
    let refused = wait_event(&mut h.events, EventKind::SharingRefused).await;
    assert_eq!(refused.mode, Some(RunMode::Foreground));
    assert!(h.sup.is_active(RunMode::Background).await);
    assert!(h.sup.is_active(RunMode::Foreground).await);
    assert_eq!(h.routine.starts(), 1);

    // once background is gone the next foreground tick takes over
    h.sup.stop(RunMode::Background).await.unwrap();
    let started = wait_event(&mut h.events, EventKind::SharingStarted).await;
    assert_eq!(started.mode, Some(RunMode::Foreground));
}

#[tokio::test(start_paused = true)]
async fn refused_foreground_leaves_background_state_alone() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Background).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    h.routine
        .emit(r#"{"name":"running","parameters":{"bytes_written":"5"}}"#);
    let relaying = ServiceState::running(Some(5));
    wait_state(&mut h.states, &relaying).await;

    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingRefused).await;
    assert_eq!(h.sup.state_snapshot(), relaying);

    h.sup.stop(RunMode::Foreground).await.unwrap();
    assert_eq!(h.sup.state_snapshot(), relaying);
    assert!(h.sup.is_active(RunMode::Background).await);
    assert!(!h.sup.is_active(RunMode::Foreground).await);
    assert_eq!(h.routine.stops(), 0);
    assert_eq!(h.lock.acquired.load(Ordering::SeqCst), 0);
    assert_eq!(h.lock.released.load(Ordering::SeqCst), 0);
    assert!(h.states.try_recv().is_none());
}

#[tokio::test(start_paused = true)]
async fn stop_during_backoff_cancels_retry() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.routine.emit(UNAUTHORIZED);
    wait_event(&mut h.events, EventKind::BackoffScheduled).await;
    h.sup.stop(RunMode::Foreground).await.unwrap();
    assert_eq!(h.sup.state_snapshot(), ServiceState::Off);

    tokio::time::sleep(Duration::from_secs(10 * 60)).await;
    assert_eq!(h.routine.starts(), 1);
    assert_eq!(h.sup.state_snapshot(), ServiceState::Off);
    while let Ok(ev) = h.events.try_recv() {
        assert_ne!(ev.kind, EventKind::RetryFired);
    }
}

#[tokio::test(start_paused = true)]
async fn events_from_stopped_start_are_ignored() {
    let mut h = harness(no_jitter());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.routine.emit(UNAUTHORIZED);
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    assert_eq!(h.routine.starts(), 2);

    h.routine.emit_on(0, r#"{"name":"running","parameters":{"bytes_written":"7"}}"#);
    h.routine.emit_on(1, r#"{"name":"running","parameters":{"bytes_written":"9"}}"#);
    wait_state(&mut h.states, &ServiceState::running(Some(9))).await;
    // the stale report never surfaced
    assert_ne!(h.sup.state_snapshot(), ServiceState::running(Some(7)));
}

#[tokio::test(start_paused = true)]
async fn malformed_event_is_dropped() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.routine.emit("{not json");
    let dropped = wait_event(&mut h.events, EventKind::EventDropped).await;
    assert!(dropped.reason.is_some());
    assert_eq!(h.sup.state_snapshot(), ServiceState::On);
    assert!(h.sup.is_active(RunMode::Foreground).await);
}

#[tokio::test(start_paused = true)]
async fn background_holds_no_wake_lock() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Background).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;
    h.sup.stop(RunMode::Background).await.unwrap();
    assert_eq!(h.lock.acquired.load(Ordering::SeqCst), 0);
    assert_eq!(h.lock.released.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn listeners_see_every_transition_in_order() {
    let h = harness(Config::default());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let id = h
        .sup
        .register_listener(ListenerFn::arc("collect", move |s: &ServiceState| {
            let _ = tx.send(s.clone());
        }))
        .unwrap();

    h.sup.start(RunMode::Background).await.unwrap();
    let mut events = h.events;
    wait_event(&mut events, EventKind::SharingStarted).await;
    h.routine.emit(r#"{"name":"running","parameters":{"bytes_written":"1"}}"#);
    h.routine.emit(r#"{"name":"traffic","parameters":{"bytes_written":"2"}}"#);
    h.sup.stop(RunMode::Background).await.unwrap();

    let mut seen = Vec::new();
    while seen.last() != Some(&ServiceState::Off) || seen.len() < 2 {
        seen.push(timeout(LONG, rx.recv()).await.unwrap().unwrap());
    }
    assert_eq!(
        seen,
        [
            ServiceState::Off,
            ServiceState::On,
            ServiceState::running(Some(1)),
            ServiceState::running(Some(2)),
            ServiceState::Off,
        ]
    );
    assert!(h.sup.unregister_listener(id));
    assert!(!h.sup.unregister_listener(id));
}

#[tokio::test(start_paused = true)]
async fn missing_api_key_degrades_to_off() {
    init_tracing();
    let routine = Arc::new(FakeRoutine::default());
    let sup = SupervisorBuilder::new(Config::default())
        .api_key("   ")
        .routine(routine.clone())
        .build();

    assert_eq!(sup.initialization(), Err(InitError::MissingApiKey));
    assert_eq!(
        sup.start(RunMode::Foreground).await,
        Err(SupervisorError::NotInitialized(InitError::MissingApiKey))
    );
    assert!(sup.stop(RunMode::Foreground).await.is_err());
    assert_eq!(sup.state_snapshot(), ServiceState::Off);

    let mut states = sup.state();
    assert_eq!(states.recv().await, Some(ServiceState::Off));
    assert_eq!(states.recv().await, None);
    assert_eq!(routine.starts(), 0);
    assert!(routine.device.lock().is_none());
}

/// Collects formatted log lines written on the current thread.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

#[tokio::test(start_paused = true)]
async fn uninitialized_entry_points_log_and_do_nothing() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish(),
    );

    let healthy = harness(Config::default());
    let id = healthy
        .sup
        .register_listener(ListenerFn::arc("noop", |_: &ServiceState| {}))
        .unwrap();

    let sup = SupervisorBuilder::new(Config::default())
        .api_key("")
        .routine(Arc::new(FakeRoutine::default()))
        .build();

    assert!(!sup.is_active(RunMode::Background).await);
    assert!(!sup.unregister_listener(id));
    sup.clear_listeners();
    assert_eq!(sup.state_snapshot(), ServiceState::Off);

    let text = logs.text();
    for op in ["is_active", "unregister_listener", "clear_listeners", "state_snapshot"] {
        assert!(
            text.contains(&format!("op=\"{op}\"")) || text.contains(&format!("op={op}")),
            "no diagnostic for {op}: {text}"
        );
    }
    // the other supervisor's listener is untouched
    assert!(healthy.sup.unregister_listener(id));
}

#[tokio::test(start_paused = true)]
async fn routine_init_failure_is_kept() {
    let sup = SupervisorBuilder::new(Config::default())
        .api_key("key")
        .routine(Arc::new(FakeRoutine::failing()))
        .build();
    assert!(matches!(sup.initialization(), Err(InitError::Routine(_))));
    assert!(matches!(
        sup.start(RunMode::Background).await,
        Err(SupervisorError::NotInitialized(InitError::Routine(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn missing_routine_is_reported() {
    let sup = SupervisorBuilder::new(Config::default()).api_key("key").build();
    assert_eq!(sup.initialization(), Err(InitError::MissingRoutine));
}

#[tokio::test(start_paused = true)]
async fn persisted_device_id_reaches_routine() {
    let tmp = tempfile::tempdir().unwrap();
    let device = DeviceIdentity::load_or_create(tmp.path(), "pixel-9").unwrap();
    let routine = Arc::new(FakeRoutine::default());
    let sup = SupervisorBuilder::new(Config::default())
        .api_key("key")
        .routine(routine.clone())
        .device(device.clone())
        .build();

    assert!(sup.initialization().is_ok());
    let stored = std::fs::read_to_string(tmp.path().join(sharevisor::INSTALLATION_FILE)).unwrap();
    assert_eq!(
        routine.device.lock().clone(),
        Some((stored, "pixel-9".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_everything() {
    let mut h = harness(Config::default());
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.sup.shutdown().await;
    assert_eq!(h.sup.state_snapshot(), ServiceState::Off);
    assert!(!h.sup.is_active(RunMode::Foreground).await);
    assert_eq!(h.routine.stops(), 1);
    assert_eq!(h.lock.released.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.sup.start(RunMode::Background).await,
        Err(SupervisorError::ShutDown)
    );
}

#[tokio::test(start_paused = true)]
async fn custom_retry_policy_is_honored() {
    let mut cfg = Config::default();
    cfg.foreground.retry = RetryPolicy {
        base: Duration::from_secs(5),
        max: Duration::from_secs(5),
        growth: Growth::Fixed,
        jitter: JitterPolicy::None,
    };
    let mut h = harness(cfg);
    h.sup.start(RunMode::Foreground).await.unwrap();
    wait_event(&mut h.events, EventKind::SharingStarted).await;

    h.routine.emit(UNAUTHORIZED);
    let ev = wait_event(&mut h.events, EventKind::BackoffScheduled).await;
    assert_eq!(ev.delay_ms, Some(5_000));
}
