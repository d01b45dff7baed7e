//! Run state counters
//!
//! A `State` is created once when a run starts. Only the engine and the
//! concurrent evaluator advance it; stop conditions and listeners receive
//! copies inside events.

use serde::{Deserialize, Serialize};

/// Mutable counters of a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    iterations: u64,
    births: u64,
    fitness_evaluations: u64,
    elapsed_millis: u64,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed population updates
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Individuals ever created
    pub fn births(&self) -> u64 {
        self.births
    }

    /// Distinct underlying fitness computations
    ///
    /// Lower than [`State::births`] when a cache served repeated solutions.
    pub fn fitness_evaluations(&self) -> u64 {
        self.fitness_evaluations
    }

    /// Wall-clock time since the run started, stamped once per iteration
    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed_millis
    }

    pub fn inc_iterations(&mut self, n: u64) {
        self.iterations += n;
    }

    pub fn inc_births(&mut self, n: u64) {
        self.births += n;
    }

    pub fn set_fitness_evaluations(&mut self, n: u64) {
        self.fitness_evaluations = n;
    }

    pub fn set_elapsed_millis(&mut self, millis: u64) {
        self.elapsed_millis = millis;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut state = State::new();
        assert_eq!(state, State::default());

        state.inc_births(4);
        state.inc_births(4);
        state.set_fitness_evaluations(6);
        state.inc_iterations(1);
        state.set_elapsed_millis(250);

        assert_eq!(state.births(), 8);
        assert_eq!(state.fitness_evaluations(), 6);
        assert_eq!(state.iterations(), 1);
        assert_eq!(state.elapsed_millis(), 250);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut state = State::new();
        let snapshot = state;
        state.inc_iterations(2);

        assert_eq!(snapshot.iterations(), 0);
        assert_eq!(state.iterations(), 2);
    }
}
