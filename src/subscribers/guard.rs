//! Panic isolation for callback workers.
//!
//! Subscriber workers and state-listener workers both run user code on their
//! own tasks. A panic there must not kill the worker, so each call goes
//! through [`guarded`], which turns the panic into a message.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

/// Polls `fut` to completion. Returns the panic message if it panicked.
pub(crate) async fn guarded<F>(fut: F) -> Option<String>
where
    F: Future<Output = ()>,
{
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .err()
        .map(|payload| panic_message(payload.as_ref()))
}

/// Text carried by a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
