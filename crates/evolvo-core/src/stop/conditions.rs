//! Threshold stop conditions

use super::StopCondition;
use crate::event::Event;
use std::fmt;

/// Stop once `iterations >= n`
#[derive(Debug, Clone, Copy)]
pub struct Iterations(pub u64);

impl<G, S, F> StopCondition<G, S, F> for Iterations {
    fn should_stop(&self, event: &Event<G, S, F>) -> bool {
        event.state().iterations() >= self.0
    }
}

/// Stop once `births >= n`
#[derive(Debug, Clone, Copy)]
pub struct Births(pub u64);

impl<G, S, F> StopCondition<G, S, F> for Births {
    fn should_stop(&self, event: &Event<G, S, F>) -> bool {
        event.state().births() >= self.0
    }
}

/// Stop once `fitness_evaluations >= n`
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluations(pub u64);

impl<G, S, F> StopCondition<G, S, F> for FitnessEvaluations {
    fn should_stop(&self, event: &Event<G, S, F>) -> bool {
        event.state().fitness_evaluations() >= self.0
    }
}

/// Stop once `elapsed_millis >= n`
#[derive(Debug, Clone, Copy)]
pub struct ElapsedMillis(pub u64);

impl<G, S, F> StopCondition<G, S, F> for ElapsedMillis {
    fn should_stop(&self, event: &Event<G, S, F>) -> bool {
        event.state().elapsed_millis() >= self.0
    }
}

/// Stop once any individual of the front satisfies a predicate on its fitness
pub struct TargetFitness<F> {
    reached: Box<dyn Fn(&F) -> bool + Send + Sync>,
}

impl<F> TargetFitness<F> {
    pub fn new<P>(reached: P) -> Self
    where
        P: Fn(&F) -> bool + Send + Sync + 'static,
    {
        Self {
            reached: Box::new(reached),
        }
    }
}

impl<F: PartialOrd + Send + Sync + 'static> TargetFitness<F> {
    /// Stop when a front fitness is at or below `target`
    pub fn at_most(target: F) -> Self {
        Self::new(move |fitness| *fitness <= target)
    }
}

impl<F> fmt::Debug for TargetFitness<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetFitness").finish_non_exhaustive()
    }
}

impl<G, S, F> StopCondition<G, S, F> for TargetFitness<F> {
    fn should_stop(&self, event: &Event<G, S, F>) -> bool {
        event
            .population()
            .firsts()
            .into_iter()
            .any(|individual| (self.reached)(individual.fitness()))
    }
}

/// Stops as soon as any of its conditions does
pub struct AnyOf<G, S, F> {
    conditions: Vec<Box<dyn StopCondition<G, S, F>>>,
}

impl<G, S, F> AnyOf<G, S, F> {
    pub fn new(conditions: Vec<Box<dyn StopCondition<G, S, F>>>) -> Self {
        Self { conditions }
    }

    /// Add one more condition
    pub fn with<C>(mut self, condition: C) -> Self
    where
        C: StopCondition<G, S, F> + 'static,
    {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl<G, S, F> fmt::Debug for AnyOf<G, S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyOf")
            .field("conditions", &self.conditions.len())
            .finish()
    }
}

impl<G, S, F> StopCondition<G, S, F> for AnyOf<G, S, F> {
    fn should_stop(&self, event: &Event<G, S, F>) -> bool {
        self.conditions.iter().any(|c| c.should_stop(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{DagPartialOrder, FitnessOrder};
    use evolvo_common::{Individual, State};
    use std::sync::Arc;

    fn event(state: State, fitnesses: &[i64]) -> Event<(), (), i64> {
        let population = fitnesses
            .iter()
            .map(|f| Individual::new((), (), *f, 0))
            .collect();
        Event::new(state, Arc::new(DagPartialOrder::new(population, &FitnessOrder)))
    }

    #[test]
    fn test_counter_thresholds() {
        let mut state = State::new();
        state.inc_iterations(3);
        state.inc_births(40);
        state.set_fitness_evaluations(25);
        state.set_elapsed_millis(900);
        let e = event(state, &[1]);

        assert!(Iterations(3).should_stop(&e));
        assert!(!Iterations(4).should_stop(&e));
        assert!(Births(40).should_stop(&e));
        assert!(!Births(41).should_stop(&e));
        assert!(FitnessEvaluations(20).should_stop(&e));
        assert!(!FitnessEvaluations(30).should_stop(&e));
        assert!(ElapsedMillis(900).should_stop(&e));
        assert!(!ElapsedMillis(1000).should_stop(&e));
    }

    #[test]
    fn test_target_fitness_looks_at_front() {
        let reached = event(State::new(), &[5, 0, 3]);
        let not_reached = event(State::new(), &[5, 2, 3]);

        let target = TargetFitness::at_most(0i64);
        assert!(target.should_stop(&reached));
        assert!(!target.should_stop(&not_reached));
    }

    #[test]
    fn test_any_of() {
        let mut state = State::new();
        state.inc_iterations(2);
        let e = event(state, &[7]);

        let condition = Iterations(10).or(TargetFitness::at_most(7i64));
        assert!(condition.should_stop(&e));

        let condition = AnyOf::new(Vec::new()).with(Iterations(10)).with(Births(1));
        assert_eq!(condition.len(), 2);
        assert!(!condition.should_stop(&e));

        let closure = |e: &Event<(), (), i64>| e.state().iterations() == 2;
        assert!(closure.should_stop(&e));
    }
}
