//! Task-execution resource
//!
//! Runs independent units of work on tokio's blocking pool, optionally gated
//! by a semaphore, and collects their results in submission order. A shared
//! cancellation flag lets any holder of a [`CancelHandle`] interrupt the
//! batch currently being awaited.

use crate::EvolverConfig;
use evolvo_common::{ConfigError, EvaluationError, EvolutionError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

type UnitHandle<T> = JoinHandle<std::result::Result<Result<T>, JoinError>>;

/// Units of one `invoke_all` call, aborted together on failure or drop
struct Batch<T> {
    handles: Vec<UnitHandle<T>>,
    aborted: Arc<AtomicBool>,
}

impl<T> Batch<T> {
    fn abort(&self) {
        // Flag first: queued units check it before running
        self.aborted.store(true, Ordering::Release);
        for handle in &self.handles {
            handle.abort();
        }
    }
}

impl<T> Drop for Batch<T> {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Clonable handle that cancels every batch run by its [`TaskRunner`]
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }
}

/// Executes units of work concurrently
#[derive(Debug, Clone)]
pub struct TaskRunner {
    permits: Option<Arc<Semaphore>>,
    cancel: CancelHandle,
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl TaskRunner {
    /// Runner without a concurrency limit
    pub fn unbounded() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            permits: None,
            cancel: CancelHandle {
                flag: Arc::new(flag),
            },
        }
    }

    /// Runner executing at most `max_concurrency` units at a time
    pub fn bounded(max_concurrency: usize) -> std::result::Result<Self, ConfigError> {
        if max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        let mut runner = Self::unbounded();
        runner.permits = Some(Arc::new(Semaphore::new(max_concurrency)));
        Ok(runner)
    }

    /// Runner sized by `config.max_concurrency`
    pub fn from_config(config: &EvolverConfig) -> std::result::Result<Self, ConfigError> {
        match config.max_concurrency {
            Some(limit) => Self::bounded(limit),
            None => Ok(Self::unbounded()),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Submit one unit of work
    ///
    /// The unit is skipped if its batch was aborted or the runner cancelled
    /// before a blocking thread picked it up.
    fn submit<T, W>(&self, work: W, aborted: Arc<AtomicBool>) -> UnitHandle<T>
    where
        W: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permits = self.permits.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            // Held until the unit completes; dropped on abort
            let _permit = match permits {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            tokio::task::spawn_blocking(move || {
                if aborted.load(Ordering::Acquire) || cancel.is_cancelled() {
                    return Err(EvolutionError::Interrupted);
                }
                work()
            })
            .await
        })
    }

    /// Run every unit and return their results in submission order
    ///
    /// Fails with the first error in submission order, or with
    /// [`EvolutionError::Interrupted`] when cancelled. Either way the
    /// outstanding units are aborted before returning, and so are they when
    /// the returned future is dropped. A unit already running on a blocking
    /// thread runs to completion; units still queued never start.
    pub async fn invoke_all<T, W>(&self, units: Vec<W>) -> Result<Vec<T>>
    where
        W: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_cancelled() {
            return Err(EvolutionError::Interrupted);
        }

        let aborted = Arc::new(AtomicBool::new(false));
        let mut batch = Batch {
            handles: units
                .into_iter()
                .map(|w| self.submit(w, Arc::clone(&aborted)))
                .collect(),
            aborted,
        };
        let outcome = self.await_in_order(&mut batch.handles).await;

        if outcome.is_err() {
            batch.abort();
            debug!(units = batch.handles.len(), "Aborted outstanding units");
        }
        outcome
    }

    async fn await_in_order<T>(&self, handles: &mut [UnitHandle<T>]) -> Result<Vec<T>> {
        let mut cancelled = self.cancel.flag.subscribe();
        if *cancelled.borrow() {
            return Err(EvolutionError::Interrupted);
        }
        let mut results = Vec::with_capacity(handles.len());

        for handle in handles.iter_mut() {
            // Only `true` is ever sent, so any change is a cancellation
            let joined = tokio::select! {
                biased;
                Ok(()) = cancelled.changed() => {
                    warn!("Cancellation requested while awaiting evaluations");
                    return Err(EvolutionError::Interrupted);
                }
                joined = handle => joined,
            };

            let value = match joined {
                Ok(Ok(result)) => result?,
                Ok(Err(e)) | Err(e) => return Err(Self::join_failure(e)),
            };
            results.push(value);
        }

        Ok(results)
    }

    fn join_failure(e: JoinError) -> EvolutionError {
        if e.is_cancelled() {
            EvolutionError::Interrupted
        } else {
            EvolutionError::Evaluation(EvaluationError::new(format!(
                "evaluation task panicked: {}",
                e
            )))
        }
    }
}
