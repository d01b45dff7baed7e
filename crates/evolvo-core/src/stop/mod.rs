//! Stop conditions
//!
//! A stop condition is a pure predicate over the event of the current
//! iteration, evaluated once per iteration before the population is updated.
//! - Threshold conditions on state counters or on the front's fitness
//! - [`RelativeElapsedTime`]: elapsed time normalised by the average cost of
//!   one real fitness evaluation

pub mod conditions;
pub mod relative;

pub use conditions::{AnyOf, Births, ElapsedMillis, FitnessEvaluations, Iterations, TargetFitness};
pub use relative::RelativeElapsedTime;

use crate::event::Event;

/// Decides whether a run terminates after the current iteration
pub trait StopCondition<G, S, F>: Send + Sync {
    fn should_stop(&self, event: &Event<G, S, F>) -> bool;

    /// Stop when either `self` or `other` says so
    fn or<O>(self, other: O) -> AnyOf<G, S, F>
    where
        Self: Sized + 'static,
        O: StopCondition<G, S, F> + 'static,
    {
        AnyOf::new(vec![Box::new(self), Box::new(other)])
    }
}

impl<G, S, F, P> StopCondition<G, S, F> for P
where
    P: Fn(&Event<G, S, F>) -> bool + Send + Sync,
{
    fn should_stop(&self, event: &Event<G, S, F>) -> bool {
        self(event)
    }
}

/// Condition that never stops; the run ends only on error or cancellation
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl<G, S, F> StopCondition<G, S, F> for Never {
    fn should_stop(&self, _event: &Event<G, S, F>) -> bool {
        false
    }
}
