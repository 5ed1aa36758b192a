//! # Diagnostic fan-out.
//!
//! Every [`Subscribe`] implementation gets its own lane: a bounded queue plus
//! a worker task. Diagnostics from the mode actors reach every lane, but a
//! slow or broken subscriber only ever hurts its own lane.
//!
//! ```text
//! emit(event) ─┬─► lane "log"     [queue] ─► worker ─► on_event()
//!              ├─► lane "metrics" [queue] ─► worker ─► on_event()
//!              └─► lane ...
//!                        │ full / closed          │ panic
//!                        ▼                        ▼
//!              Bus: SubscriberOverflow   Bus: SubscriberPanicked
//! ```
//!
//! A lane delivers in emit order. Lanes are not ordered against each other.
//! `emit` never waits: a full lane drops the event for that lane alone.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, guarded};

struct Lane {
    name: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
}

impl Lane {
    /// Queues `event`, or names why the lane refused it.
    fn offer(&self, event: &Arc<Event>) -> Result<(), &'static str> {
        self.queue
            .try_send(Arc::clone(event))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => "full",
                mpsc::error::TrySendError::Closed(_) => "closed",
            })
    }
}

/// Delivers supervisor diagnostics to a fixed list of subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Opens one lane per subscriber. Needs a running tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (lanes, workers): (Vec<_>, Vec<_>) = subs
            .into_iter()
            .map(|sub| open_lane(sub, bus.clone()))
            .unzip();
        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Offers `event` to every lane without waiting.
    ///
    /// A refused `SubscriberOverflow` is not reported again.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());
        let report = event.kind != EventKind::SubscriberOverflow;

        for lane in &self.lanes {
            let Err(reason) = lane.offer(&event) else {
                continue;
            };
            if report {
                tracing::debug!(subscriber = lane.name, reason, kind = ?event.kind, "diagnostic dropped");
                self.bus.publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }

    /// True when no subscriber was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Number of lanes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Closes every lane and waits for the workers to drain.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

fn open_lane(sub: Arc<dyn Subscribe>, bus: Bus) -> (Lane, JoinHandle<()>) {
    let name = sub.name();
    let (queue, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

    let worker = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(info) = guarded(sub.on_event(&event)).await {
                tracing::warn!(subscriber = name, %info, "subscriber panicked");
                bus.publish(Event::subscriber_panicked(name, info));
            }
        }
    });
    (Lane { name, queue }, worker)
}
