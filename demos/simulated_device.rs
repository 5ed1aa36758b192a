//! # Example: Simulated device
//!
//! Drives the supervisor against an in-process routine that reports
//! `starting → running → traffic...` and rejects the first start as unauthorized.
//!
//! Walks through:
//! - critical error → backoff → retry
//! - VPN detected → suspended → resumed on the next health tick
//! - low battery → suspended → resumed
//! - background start displacing foreground
//!
//! Run with: `RUST_LOG=info cargo run --example simulated_device --features logging`

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use sharevisor::{
    Config, DeviceIdentity, EventCallback, ListenerFn, LogWriter, RoutineError, RunMode,
    ServiceState, SharingRoutine, StaticProbe, Subscribe, SupervisorBuilder,
};

/// In-process stand-in for the native routine.
#[derive(Default)]
struct SimulatedRoutine {
    starts: AtomicU64,
    running: Arc<AtomicBool>,
}

impl SharingRoutine for SimulatedRoutine {
    fn initialize(&self, device_id: &str, device_name: &str) -> Result<(), RoutineError> {
        println!("[routine] initialize id={device_id} name={device_name}");
        Ok(())
    }

    fn start(&self, _api_token: &str, on_event: EventCallback) {
        let attempt = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        thread::spawn(move || {
            on_event(r#"{"name":"starting"}"#.to_string());
            thread::sleep(Duration::from_millis(300));
            if attempt == 1 {
                on_event(r#"{"name":"not_running","parameters":{"error":"unauthorized"}}"#.into());
                return;
            }
            on_event(r#"{"name":"running"}"#.to_string());
            let mut written = 0u64;
            while running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(500));
                written += 4096;
                on_event(format!(
                    r#"{{"name":"traffic","parameters":{{"bytes_written":"{written}"}}}}"#
                ));
            }
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut cfg = Config::default();
    cfg.foreground.health_interval = Duration::from_secs(2);
    cfg.background.health_interval = Duration::from_secs(2);
    cfg.foreground.retry.base = Duration::from_secs(1);
    cfg.foreground.retry.max = Duration::from_secs(5);

    let probe = Arc::new(StaticProbe::default());
    let dir = std::env::temp_dir().join("sharevisor-demo");
    let device = DeviceIdentity::load_or_create(&dir, "simulated-device")?;
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    let sup = SupervisorBuilder::new(cfg)
        .api_key("demo-key")
        .routine(Arc::new(SimulatedRoutine::default()))
        .probe(probe.clone())
        .device(device)
        .with_subscribers(subs)
        .build();

    sup.register_listener(ListenerFn::arc("printer", |state: &ServiceState| {
        println!("[state] {state}");
    }))?;

    sup.start(RunMode::Foreground).await?;
    tokio::time::sleep(Duration::from_secs(15)).await;

    println!("--- VPN on");
    probe.set_vpn(true);
    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("--- VPN off");
    probe.set_vpn(false);
    tokio::time::sleep(Duration::from_secs(4)).await;

    println!("--- battery 12%");
    probe.set_battery(12, false);
    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("--- charger plugged in");
    probe.set_battery(12, true);
    tokio::time::sleep(Duration::from_secs(4)).await;

    println!("--- switching to background");
    sup.start(RunMode::Background).await?;
    tokio::time::sleep(Duration::from_secs(4)).await;

    sup.shutdown().await;
    println!("final state: {}", sup.state_snapshot());
    Ok(())
}
