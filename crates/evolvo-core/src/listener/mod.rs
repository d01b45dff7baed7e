//! Event listeners
//!
//! Listeners are one-way sinks receiving the event of every iteration.
//! - [`Listener::then`] chains listeners in registration order
//! - [`Deferred`] hands events to a background task through a channel
//! - [`TracingListener`] logs progress through `tracing`
//!
//! A panicking listener never aborts a run: [`dispatch`] isolates each call.

pub mod deferred;
pub mod logging;

pub use deferred::{Deferred, DeferredMode};
pub use logging::{FitnessTracingListener, TracingListener};

use crate::event::Event;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Sink for per-iteration events
pub trait Listener<G, S, F>: Send + Sync {
    fn listen(&self, event: &Event<G, S, F>);

    /// Deliver every event to `self`, then to `next`
    fn then<L>(self, next: L) -> Chain<Self, L>
    where
        Self: Sized,
        L: Listener<G, S, F>,
    {
        Chain { first: self, next }
    }
}

impl<G, S, F, L> Listener<G, S, F> for L
where
    L: Fn(&Event<G, S, F>) + Send + Sync,
{
    fn listen(&self, event: &Event<G, S, F>) {
        self(event)
    }
}

/// Deliver `event` to `listener`, containing any panic
///
/// Returns `false` when the listener panicked.
pub fn dispatch<G, S, F, L>(listener: &L, event: &Event<G, S, F>) -> bool
where
    L: Listener<G, S, F> + ?Sized,
{
    match catch_unwind(AssertUnwindSafe(|| listener.listen(event))) {
        Ok(()) => true,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(
                iteration = event.state().iterations(),
                reason = %reason,
                "Listener failed, event dropped for this listener"
            );
            false
        }
    }
}

/// Two listeners delivered in sequence
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    next: B,
}

impl<G, S, F, A, B> Listener<G, S, F> for Chain<A, B>
where
    A: Listener<G, S, F>,
    B: Listener<G, S, F>,
{
    fn listen(&self, event: &Event<G, S, F>) {
        dispatch(&self.first, event);
        dispatch(&self.next, event);
    }
}

/// Listener ignoring every event
#[derive(Debug, Clone, Copy, Default)]
pub struct Deaf;

impl<G, S, F> Listener<G, S, F> for Deaf {
    fn listen(&self, _event: &Event<G, S, F>) {}
}
