//! Periodic health check driver.

use std::time::Duration;

use tokio::{select, sync::mpsc, time};
use tokio_util::sync::CancellationToken;

use crate::core::actor::Command;

/// Sends [`Command::HealthTick`] every `period`, the first one immediately.
///
/// Stops when `token` is cancelled or the actor's inbox is closed.
pub(crate) fn spawn(
    period: Duration,
    tx: mpsc::UnboundedSender<Command>,
    token: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if token.is_cancelled() || tx.send(Command::HealthTick).is_err() {
                break;
            }
        }
    });
}
