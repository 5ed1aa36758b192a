//! # Mode registry: one actor per started run mode.
//!
//! ## Architecture
//! ```text
//! Supervisor::start(mode) ──► Registry::start(mode)
//!                                ├─► already running?  → no-op
//!                                ├─► ModeArbiter::conflicting(mode) → stop_handle(other)
//!                                └─► spawn ModeActor (session = runtime_token.child_token())
//! Supervisor::stop(mode)  ──► Registry::stop(mode)  → Stop → join
//! Supervisor::shutdown()  ──► Registry::cancel_all() → cancel → join
//! ```
//!
//! ## Rules
//! - Registry owns the actor handles (inbox + JoinHandle + CancellationToken)
//! - Table updates are serialized by one async mutex, so "stop the conflicting
//!   mode, then spawn" is atomic with respect to other callers

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::actor::{ActorContext, Command, ModeActor};
use crate::core::arbiter::ModeArbiter;
use crate::error::SupervisorError;
use crate::events::{Event, EventKind};
use crate::state::{RunMode, ServiceState};

/// Handle to a running mode actor.
struct Handle {
    tx: mpsc::UnboundedSender<Command>,
    join: JoinHandle<()>,
    session: CancellationToken,
}

/// Table of started modes.
pub(crate) struct Registry {
    modes: Mutex<HashMap<RunMode, Handle>>,
    ctx: ActorContext,
    runtime_token: CancellationToken,
}

impl Registry {
    pub fn new(ctx: ActorContext, runtime_token: CancellationToken) -> Self {
        Self {
            modes: Mutex::new(HashMap::new()),
            ctx,
            runtime_token,
        }
    }

    /// Starts `mode` unless it already runs, stopping a conflicting mode first.
    pub async fn start(&self, mode: RunMode) -> Result<(), SupervisorError> {
        let mut modes = self.modes.lock().await;
        if self.runtime_token.is_cancelled() {
            tracing::warn!(%mode, "start after shutdown ignored");
            return Err(SupervisorError::ShutDown);
        }
        if modes.contains_key(&mode) {
            tracing::debug!(%mode, "already started");
            return Ok(());
        }

        if let Some(other) = ModeArbiter::conflicting(mode) {
            if let Some(handle) = modes.remove(&other) {
                tracing::info!(yielding = %other, starting = %mode, "stopping conflicting mode");
                self.ctx.bus.publish(
                    Event::new(EventKind::ModeYielded)
                        .with_mode(other)
                        .with_reason(format!("{mode} is starting")),
                );
                if let Err(e) = self.stop_handle(other, handle).await {
                    tracing::error!(mode = %other, error = %e, "conflicting mode did not stop cleanly");
                }
            }
        }

        let session = self.runtime_token.child_token();
        let (actor, tx) = ModeActor::new(mode, self.ctx.clone());
        let join = tokio::spawn(actor.run(session.clone()));
        modes.insert(mode, Handle { tx, join, session });
        Ok(())
    }

    /// Stops `mode` and waits for its teardown. Stopping an idle mode only logs.
    pub async fn stop(&self, mode: RunMode) -> Result<(), SupervisorError> {
        let handle = self.modes.lock().await.remove(&mode);
        match handle {
            Some(handle) => self.stop_handle(mode, handle).await,
            None => {
                tracing::debug!(%mode, "stop requested but mode is not running");
                Ok(())
            }
        }
    }

    /// True while `mode` has a live actor.
    pub async fn is_active(&self, mode: RunMode) -> bool {
        self.modes.lock().await.contains_key(&mode)
    }

    /// Cancels every actor and waits for all of them.
    pub async fn cancel_all(&self) {
        let handles: Vec<(RunMode, Handle)> = {
            let mut modes = self.modes.lock().await;
            modes.drain().collect()
        };
        for (_, h) in &handles {
            h.session.cancel();
        }
        for (mode, h) in handles {
            if let Err(e) = self.join_and_report(mode, h.join).await {
                tracing::error!(%mode, error = %e, "actor failed during shutdown");
            }
        }
    }

    async fn stop_handle(&self, mode: RunMode, handle: Handle) -> Result<(), SupervisorError> {
        if handle.tx.send(Command::Stop).is_err() {
            handle.session.cancel();
        }
        self.join_and_report(mode, handle.join).await
    }

    /// Await join; if the actor died, do its teardown on its behalf.
    async fn join_and_report(
        &self,
        mode: RunMode,
        join: JoinHandle<()>,
    ) -> Result<(), SupervisorError> {
        match join.await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(%mode, error = %e, "mode actor died");
                let idle_or_owned = self.ctx.routine.owner().is_none_or(|m| m == mode);
                self.ctx.routine.stop(mode);
                if idle_or_owned {
                    self.ctx.state.publish(ServiceState::Off);
                }
                Err(SupervisorError::ActorGone { mode })
            }
        }
    }
}
