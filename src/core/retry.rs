//! One-shot backoff timer.

use std::time::Duration;

use tokio::{select, sync::mpsc, time};
use tokio_util::sync::CancellationToken;

use crate::core::actor::Command;

/// Sends [`Command::RetryDue`] after `delay` unless `token` is cancelled first.
pub(crate) fn spawn(
    id: u64,
    delay: Duration,
    tx: mpsc::UnboundedSender<Command>,
    token: CancellationToken,
) {
    tokio::spawn(async move {
        select! {
            _ = token.cancelled() => return,
            _ = time::sleep(delay) => {}
        }
        if token.is_cancelled() {
            return;
        }
        let _ = tx.send(Command::RetryDue { id });
    });
}
