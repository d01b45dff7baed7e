//! Progress logging through `tracing`

use super::Listener;
use crate::event::Event;
use std::fmt::Debug;
use tracing::{debug, info};

/// Logs one structured line per iteration
///
/// Front fitness values are logged at debug level, and only when `F: Debug`
/// (see [`TracingListener::with_fitness`]).
#[derive(Debug, Clone, Default)]
pub struct TracingListener {
    label: String,
    every: u64,
}

impl TracingListener {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            every: 1,
        }
    }

    /// Log only every `n`th iteration
    pub fn every(mut self, n: u64) -> Self {
        self.every = n.max(1);
        self
    }

    /// Also log the fitness of every front member
    pub fn with_fitness(self) -> FitnessTracingListener {
        FitnessTracingListener { inner: self }
    }

    fn due(&self, iteration: u64) -> bool {
        iteration % self.every.max(1) == 0
    }

    fn log_state<G, S, F>(&self, event: &Event<G, S, F>) {
        let state = event.state();
        info!(
            run = %self.label,
            iteration = state.iterations(),
            births = state.births(),
            fitness_evaluations = state.fitness_evaluations(),
            elapsed_ms = state.elapsed_millis(),
            population = event.population().len(),
            front = event.population().first_indices().len(),
            "Iteration completed"
        );
    }
}

impl<G, S, F> Listener<G, S, F> for TracingListener {
    fn listen(&self, event: &Event<G, S, F>) {
        if self.due(event.state().iterations()) {
            self.log_state(event);
        }
    }
}

/// [`TracingListener`] that also logs front fitness values
#[derive(Debug, Clone)]
pub struct FitnessTracingListener {
    inner: TracingListener,
}

impl<G, S, F: Debug> Listener<G, S, F> for FitnessTracingListener {
    fn listen(&self, event: &Event<G, S, F>) {
        let iteration = event.state().iterations();
        if !self.inner.due(iteration) {
            return;
        }
        self.inner.log_state(event);
        let front: Vec<&F> = event
            .population()
            .firsts()
            .into_iter()
            .map(|individual| individual.fitness())
            .collect();
        debug!(run = %self.inner.label, iteration, front = ?front, "Front fitness");
    }
}
