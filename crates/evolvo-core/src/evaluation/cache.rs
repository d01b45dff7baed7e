//! Memoizing fitness cache
//!
//! Wraps a fitness function so that repeated solutions are evaluated once:
//! - Per-key slots so concurrent callers with the same key share one computation
//! - Atomic invocation, hit and load-time counters
//! - Optional entry bound, without changing the evaluation interface

use super::fitness::{FitnessFunction, LoadStats};
use crate::EvolverConfig;
use dashmap::DashMap;
use evolvo_common::{ConfigError, EvaluationError};
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// Snapshot of cache statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    /// Underlying (non-memoized) invocations, failed ones included
    pub invocations: u64,
    /// Calls answered from memory
    pub hits: u64,
    /// Mean wall-clock cost of one underlying invocation, in nanoseconds
    pub average_load_penalty: f64,
    /// Resident entries
    pub entry_count: u64,
}

/// Underlying invocations and their summed cost, updated together
#[derive(Debug, Default, Clone, Copy)]
struct LoadTotals {
    invocations: u64,
    total_nanos: u64,
}

impl LoadTotals {
    fn record(&mut self, elapsed_nanos: u64) {
        self.invocations += 1;
        self.total_nanos = self.total_nanos.saturating_add(elapsed_nanos);
    }

    fn average(&self) -> f64 {
        if self.invocations == 0 {
            return 0.0;
        }
        self.total_nanos as f64 / self.invocations as f64
    }
}

/// Cache counters
#[derive(Debug, Default)]
struct CacheMetrics {
    hits: AtomicU64,
    load: Mutex<LoadTotals>,
}

type Slot<F> = Arc<Mutex<Option<F>>>;

/// Fitness function wrapper memoizing results by solution
pub struct CachedFitness<S, F> {
    inner: Arc<dyn FitnessFunction<S, F>>,
    entries: DashMap<S, Slot<F>>,
    max_entries: Option<usize>,
    metrics: CacheMetrics,
}

impl<S, F> CachedFitness<S, F>
where
    S: Hash + Eq + Clone,
    F: Clone,
{
    /// Create an unbounded cache around `inner`
    pub fn new(inner: Arc<dyn FitnessFunction<S, F>>) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            max_entries: None,
            metrics: CacheMetrics::default(),
        }
    }

    /// Create a cache holding at most `max_entries` results
    pub fn bounded(
        inner: Arc<dyn FitnessFunction<S, F>>,
        max_entries: usize,
    ) -> Result<Self, ConfigError> {
        if max_entries == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        let mut cache = Self::new(inner);
        cache.max_entries = Some(max_entries);
        Ok(cache)
    }

    /// Create a cache sized by `config.cache_capacity`
    pub fn from_config(
        inner: Arc<dyn FitnessFunction<S, F>>,
        config: &EvolverConfig,
    ) -> Result<Self, ConfigError> {
        match config.cache_capacity {
            Some(capacity) => Self::bounded(inner, capacity),
            None => Ok(Self::new(inner)),
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let load = *self.metrics.load.lock();
        CacheStats {
            invocations: load.invocations,
            hits: self.metrics.hits.load(Ordering::Acquire),
            average_load_penalty: load.average(),
            entry_count: self.entries.len() as u64,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all memoized results, keeping the counters
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn load_penalty(&self) -> f64 {
        self.metrics.load.lock().average()
    }

    fn invocations(&self) -> u64 {
        self.metrics.load.lock().invocations
    }

    /// Get or create the slot for `key`
    ///
    /// The map guard is released before the caller locks the slot, so a slow
    /// computation never blocks other keys sharing the shard.
    fn slot(&self, key: &S) -> Slot<F> {
        if let Some(slot) = self.entries.get(key) {
            return slot.clone();
        }

        if let Some(max_entries) = self.max_entries {
            // Evict if at capacity
            while self.entries.len() >= max_entries {
                let victim = self.entries.iter().next().map(|e| e.key().clone());
                match victim {
                    Some(victim) => {
                        self.entries.remove(&victim);
                        trace!("Evicted cache entry");
                    }
                    None => break,
                }
            }
        }

        self.entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }
}

impl<S, F> FitnessFunction<S, F> for CachedFitness<S, F>
where
    S: Hash + Eq + Clone + Send + Sync,
    F: Clone + Send + Sync,
{
    fn evaluate(&self, solution: &S) -> Result<F, EvaluationError> {
        let slot = self.slot(solution);
        let mut value = slot.lock();

        if let Some(fitness) = value.as_ref() {
            self.metrics.hits.fetch_add(1, Ordering::AcqRel);
            return Ok(fitness.clone());
        }

        let started = Instant::now();
        let result = self.inner.evaluate(solution);
        let elapsed = started.elapsed().as_nanos().min(u64::MAX as u128) as u64;

        self.metrics.load.lock().record(elapsed);

        match result {
            Ok(fitness) => {
                *value = Some(fitness.clone());
                Ok(fitness)
            }
            Err(e) => {
                drop(value);
                // Free the slot unless a concurrent caller is already refilling it
                self.entries.remove_if(solution, |_, resident| {
                    Arc::ptr_eq(resident, &slot)
                        && resident.try_lock().is_some_and(|v| v.is_none())
                });
                debug!(error = %e, "Fitness computation failed, result not cached");
                Err(e)
            }
        }
    }

    fn invocation_count(&self) -> Option<u64> {
        Some(self.invocations())
    }

    fn average_load_penalty(&self) -> f64 {
        self.load_penalty()
    }
}

impl<S, F> LoadStats for CachedFitness<S, F>
where
    S: Hash + Eq + Clone + Send + Sync,
    F: Clone + Send + Sync,
{
    fn invocation_count(&self) -> Option<u64> {
        Some(self.invocations())
    }

    fn average_load_penalty(&self) -> f64 {
        self.load_penalty()
    }
}
