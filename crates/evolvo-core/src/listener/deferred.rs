//! Deferred listener dispatch
//!
//! Events are pushed onto an mpsc channel and delivered by a background task,
//! so a slow listener never stalls the evolution loop. The sending side never
//! waits: a full bounded channel drops the event.

use super::{dispatch, Listener};
use crate::event::Event;
use crate::EvolverConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Channel flavour used by [`Deferred`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredMode {
    /// Holds at most this many undelivered events, dropping newer ones
    Bounded(usize),
    /// Never drops events
    Unbounded,
}

enum EventSender<E> {
    Bounded(mpsc::Sender<E>),
    Unbounded(mpsc::UnboundedSender<E>),
}

/// Listener forwarding events to another listener running on its own task
pub struct Deferred<G, S, F> {
    tx: EventSender<Event<G, S, F>>,
    dropped: Arc<AtomicU64>,
}

impl<G, S, F> Deferred<G, S, F>
where
    G: Send + Sync + 'static,
    S: Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    /// Spawn the delivery task for `listener`
    ///
    /// The task drains the channel and exits once this `Deferred` is dropped;
    /// awaiting the returned handle waits for every queued event.
    pub fn spawn<L>(listener: L, mode: DeferredMode) -> (Self, JoinHandle<()>)
    where
        L: Listener<G, S, F> + 'static,
    {
        match mode {
            DeferredMode::Bounded(capacity) => {
                let (tx, mut rx) = mpsc::channel::<Event<G, S, F>>(capacity.max(1));
                let handle = tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        dispatch(&listener, &event);
                    }
                    debug!("Event channel closed, deferred listener exiting");
                });
                (Self::with_sender(EventSender::Bounded(tx)), handle)
            }
            DeferredMode::Unbounded => {
                let (tx, mut rx) = mpsc::unbounded_channel::<Event<G, S, F>>();
                let handle = tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        dispatch(&listener, &event);
                    }
                    debug!("Event channel closed, deferred listener exiting");
                });
                (Self::with_sender(EventSender::Unbounded(tx)), handle)
            }
        }
    }

    /// Spawn with the channel flavour chosen by `config.listener_buffer`
    pub fn from_config<L>(listener: L, config: &EvolverConfig) -> (Self, JoinHandle<()>)
    where
        L: Listener<G, S, F> + 'static,
    {
        let mode = match config.listener_buffer {
            Some(capacity) => DeferredMode::Bounded(capacity),
            None => DeferredMode::Unbounded,
        };
        Self::spawn(listener, mode)
    }

    fn with_sender(tx: EventSender<Event<G, S, F>>) -> Self {
        Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<G, S, F> Deferred<G, S, F> {
    /// Events dropped because the channel was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn record_drop(&self, iteration: u64, reason: &str) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        warn!(iteration, reason, "Deferred listener dropped an event");
    }
}

impl<G, S, F> Listener<G, S, F> for Deferred<G, S, F>
where
    G: Send + Sync,
    S: Send + Sync,
    F: Send + Sync,
{
    fn listen(&self, event: &Event<G, S, F>) {
        let iteration = event.state().iterations();
        match &self.tx {
            EventSender::Bounded(tx) => match tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => self.record_drop(iteration, "channel full"),
                Err(TrySendError::Closed(_)) => self.record_drop(iteration, "channel closed"),
            },
            EventSender::Unbounded(tx) => {
                if tx.send(event.clone()).is_err() {
                    self.record_drop(iteration, "channel closed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{DagPartialOrder, FitnessOrder};
    use evolvo_common::State;
    use parking_lot::Mutex;
    use std::time::Duration;

    type TestEvent = Event<(), (), u8>;

    fn event(iterations: u64) -> TestEvent {
        let mut state = State::new();
        state.inc_iterations(iterations);
        Event::new(state, Arc::new(DagPartialOrder::new(Vec::new(), &FitnessOrder)))
    }

    #[tokio::test]
    async fn test_unbounded_delivers_everything_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (deferred, handle) = Deferred::spawn(
            move |e: &TestEvent| sink.lock().push(e.state().iterations()),
            DeferredMode::Unbounded,
        );

        for i in 0..5 {
            deferred.listen(&event(i));
        }
        drop(deferred);
        handle.await.unwrap();

        assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_bounded_never_blocks_the_sender() {
        let seen = Arc::new(Mutex::new(0u64));
        let sink = seen.clone();
        let (deferred, handle) = Deferred::spawn(
            move |_: &TestEvent| {
                std::thread::sleep(Duration::from_millis(5));
                *sink.lock() += 1;
            },
            DeferredMode::Bounded(1),
        );

        // The current-thread runtime cannot run the consumer while we send
        for i in 0..4 {
            deferred.listen(&event(i));
        }
        let dropped = deferred.dropped();
        drop(deferred);
        handle.await.unwrap();

        assert_eq!(dropped, 3);
        assert_eq!(*seen.lock(), 1);
    }

    #[tokio::test]
    async fn test_panicking_deferred_listener_keeps_consuming() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (deferred, handle) = Deferred::spawn(
            move |e: &TestEvent| {
                let iteration = e.state().iterations();
                if iteration == 1 {
                    panic!("bad event");
                }
                sink.lock().push(iteration);
            },
            DeferredMode::Unbounded,
        );

        for i in 0..3 {
            deferred.listen(&event(i));
        }
        drop(deferred);
        handle.await.unwrap();

        assert_eq!(*seen.lock(), vec![0, 2]);
    }
}
