//! # State listeners.
//!
//! [`StateListener`] is the callback-style way to observe [`ServiceState`]
//! transitions. Each registered listener is driven by its own worker task that
//! drains a [`StateStream`](crate::StateStream), so a slow listener never blocks
//! the supervisor or other listeners.
//!
//! [`ListenerFn`] wraps a plain closure:
//! ```rust
//! use std::sync::Arc;
//! use sharevisor::{ListenerFn, ServiceState, StateListener};
//!
//! let l: Arc<dyn StateListener> = ListenerFn::arc("printer", |state: &ServiceState| {
//!     println!("state changed: {state}");
//! });
//! assert_eq!(l.name(), "printer");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use crate::state::ServiceState;

/// Receives every state transition, in emission order.
///
/// The current state is delivered first, right after registration.
#[async_trait]
pub trait StateListener: Send + Sync + 'static {
    /// Called once per transition.
    async fn on_state_change(&self, state: &ServiceState);

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed listener.
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F>
where
    F: Fn(&ServiceState) + Send + Sync + 'static,
{
    /// Creates a new closure-backed listener.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> StateListener for ListenerFn<F>
where
    F: Fn(&ServiceState) + Send + Sync + 'static,
{
    async fn on_state_change(&self, state: &ServiceState) {
        (self.f)(state)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
