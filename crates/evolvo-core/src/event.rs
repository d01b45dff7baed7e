//! Per-iteration snapshot handed to listeners and stop conditions

use crate::order::DagPartialOrder;
use evolvo_common::{Individual, State};
use std::sync::Arc;

/// Ranked population of one iteration
pub type RankedPopulation<G, S, F> = DagPartialOrder<Individual<G, S, F>>;

/// Immutable `(state, ranked population)` pair
///
/// Cloning is cheap: the state is copied and the population shared.
#[derive(Debug)]
pub struct Event<G, S, F> {
    state: State,
    population: Arc<RankedPopulation<G, S, F>>,
}

impl<G, S, F> Event<G, S, F> {
    pub fn new(state: State, population: Arc<RankedPopulation<G, S, F>>) -> Self {
        Self { state, population }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn population(&self) -> &RankedPopulation<G, S, F> {
        &self.population
    }
}

// Manual impl: cloning must not require `G: Clone` and friends
impl<G, S, F> Clone for Event<G, S, F> {
    fn clone(&self) -> Self {
        Self {
            state: self.state,
            population: Arc::clone(&self.population),
        }
    }
}
