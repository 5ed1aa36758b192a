//! # StateBroadcaster: the single source of truth for [`ServiceState`].
//!
//! Holds the latest state and pushes every transition to all subscribers.
//!
//! ## Architecture
//! ```text
//! ModeActor (fg) ──┐
//!                  ├──► publish(state) ──► current = state
//! ModeActor (bg) ──┘            │
//!                               ├──► [queue S1] ──► StateStream (caller)
//!                               ├──► [queue S2] ──► listener worker ──► on_state_change()
//!                               └──► [queue SN] ──► ...
//! ```
//!
//! ## Rules
//! - **Replay**: a new subscriber first receives the current state.
//! - **No skips**: queues are unbounded; each subscriber sees every transition in order.
//! - **Coalescing**: publishing a state equal to the current one is a no-op.
//! - **Cleanup**: closed subscribers are pruned on the next publish.
//! - **Panic isolation**: a panicking listener is logged and keeps receiving.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::{sync::mpsc, task::JoinHandle};

use super::{ServiceState, StateListener};
use crate::subscribers::guarded;

/// Identifier returned by [`StateBroadcaster::register_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered stream of state transitions, starting with the state at subscription time.
pub struct StateStream {
    rx: mpsc::UnboundedReceiver<ServiceState>,
}

impl StateStream {
    /// A stream that yields `state` once and then ends.
    pub(crate) fn once(state: ServiceState) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(state);
        Self { rx }
    }

    /// Receives the next transition; `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<ServiceState> {
        self.rx.recv().await
    }

    /// Returns an already queued transition without waiting.
    pub fn try_recv(&mut self) -> Option<ServiceState> {
        self.rx.try_recv().ok()
    }
}

impl Stream for StateStream {
    type Item = ServiceState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

struct Inner {
    current: ServiceState,
    subscribers: Vec<mpsc::UnboundedSender<ServiceState>>,
}

/// Holds the current [`ServiceState`] and fans transitions out to subscribers.
pub struct StateBroadcaster {
    inner: Mutex<Inner>,
    listeners: Mutex<HashMap<ListenerId, JoinHandle<()>>>,
    next_listener: AtomicU64,
}

impl StateBroadcaster {
    /// Creates a broadcaster in [`ServiceState::Off`].
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: ServiceState::Off,
                subscribers: Vec::new(),
            }),
            listeners: Mutex::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Returns the current state.
    pub fn snapshot(&self) -> ServiceState {
        self.inner.lock().current.clone()
    }

    /// Sets the current state and delivers it to every subscriber.
    ///
    /// Returns `false` (and delivers nothing) when `state` equals the current state.
    pub fn publish(&self, state: ServiceState) -> bool {
        let mut inner = self.inner.lock();
        if inner.current == state {
            return false;
        }
        inner.current = state.clone();
        inner.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
        true
    }

    /// Subscribes to transitions; the current state is delivered first.
    pub fn subscribe(&self) -> StateStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        let _ = tx.send(inner.current.clone());
        inner.subscribers.push(tx);
        StateStream { rx }
    }

    /// Number of live subscriptions (streams and listeners).
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }

    /// Registers a listener driven by a dedicated worker task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn register_listener(&self, listener: Arc<dyn StateListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        let mut stream = self.subscribe();

        let handle = tokio::spawn(async move {
            while let Some(state) = stream.recv().await {
                if let Some(info) = guarded(listener.on_state_change(&state)).await {
                    tracing::warn!(listener = listener.name(), %info, "state listener panicked");
                }
            }
        });

        self.listeners.lock().insert(id, handle);
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        match self.listeners.lock().remove(&id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Removes every registered listener.
    pub fn clear_listeners(&self) {
        for (_, handle) in self.listeners.lock().drain() {
            handle.abort();
        }
    }
}

impl Default for StateBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StateBroadcaster {
    fn drop(&mut self) {
        for (_, handle) in self.listeners.get_mut().drain() {
            handle.abort();
        }
    }
}
