//! Evolution engine
//!
//! Fixed orchestrator over two pluggable strategies: one builds the first
//! population, the other turns a ranked population into the next one.
//!
//! ```text
//! init ─▶ rank ─▶ stamp time ─▶ broadcast ─▶ stop? ──yes──▶ front solutions
//!           ▲                                  │no
//!           └──── iterations += 1 ◀── update ◀─┘
//! ```

use crate::evaluation::{build_individuals, FitnessFunction, SolutionMapper, TaskRunner};
use crate::event::{Event, RankedPopulation};
use crate::listener::{dispatch, Listener};
use crate::order::{DagPartialOrder, PartialComparator};
use crate::stop::StopCondition;
use async_trait::async_trait;
use evolvo_common::{EvolutionError, Individual, Result, State};
use rand::RngCore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Supplies fresh genotypes
pub trait GenotypeFactory<G>: Send + Sync {
    fn build(&self, n: usize, rng: &mut dyn RngCore) -> Vec<G>;
}

impl<G, Fac> GenotypeFactory<G> for Fac
where
    Fac: Fn(usize, &mut dyn RngCore) -> Vec<G> + Send + Sync,
{
    fn build(&self, n: usize, rng: &mut dyn RngCore) -> Vec<G> {
        self(n, rng)
    }
}

/// Everything a strategy needs to create and evaluate individuals
pub struct EvolutionContext<'a, G, S, F> {
    pub fitness: &'a Arc<dyn FitnessFunction<S, F>>,
    pub mapper: &'a Arc<dyn SolutionMapper<G, S>>,
    pub rng: &'a mut (dyn RngCore + Send),
    pub runner: &'a TaskRunner,
    pub state: &'a mut State,
}

impl<'a, G, S, F> EvolutionContext<'a, G, S, F>
where
    G: Send + 'static,
    S: Send + 'static,
    F: Send + 'static,
{
    /// Map and evaluate `genotypes` concurrently, updating the run state
    pub async fn build_individuals(
        &mut self,
        genotypes: Vec<G>,
    ) -> Result<Vec<Individual<G, S, F>>> {
        build_individuals(genotypes, self.mapper, self.fitness, self.runner, self.state).await
    }
}

/// Builds the first population
#[async_trait]
pub trait PopulationInit<G, S, F>: Send + Sync {
    async fn init(
        &self,
        ctx: &mut EvolutionContext<'_, G, S, F>,
    ) -> Result<Vec<Individual<G, S, F>>>;
}

/// Builds the next population from the ranked current one
#[async_trait]
pub trait PopulationUpdate<G, S, F>: Send + Sync {
    async fn update(
        &self,
        ranked: &RankedPopulation<G, S, F>,
        ctx: &mut EvolutionContext<'_, G, S, F>,
    ) -> Result<Vec<Individual<G, S, F>>>;
}

/// Initial population of `size` genotypes drawn from a factory
pub struct FactoryInit<G> {
    factory: Arc<dyn GenotypeFactory<G>>,
    size: usize,
}

impl<G> FactoryInit<G> {
    pub fn new(factory: impl GenotypeFactory<G> + 'static, size: usize) -> Self {
        Self {
            factory: Arc::new(factory),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

#[async_trait]
impl<G, S, F> PopulationInit<G, S, F> for FactoryInit<G>
where
    G: Send + Sync + 'static,
    S: Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    async fn init(
        &self,
        ctx: &mut EvolutionContext<'_, G, S, F>,
    ) -> Result<Vec<Individual<G, S, F>>> {
        let genotypes = self.factory.build(self.size, &mut *ctx.rng);
        ctx.build_individuals(genotypes).await
    }
}

/// Iterative evolver: rank, report, check, update
pub struct Evolver<G, S, F> {
    mapper: Arc<dyn SolutionMapper<G, S>>,
    comparator: Arc<dyn PartialComparator<Individual<G, S, F>>>,
    init: Box<dyn PopulationInit<G, S, F>>,
    update: Box<dyn PopulationUpdate<G, S, F>>,
}

impl<G, S, F> Evolver<G, S, F>
where
    G: Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    pub fn new(
        mapper: impl SolutionMapper<G, S> + 'static,
        comparator: impl PartialComparator<Individual<G, S, F>> + 'static,
        init: impl PopulationInit<G, S, F> + 'static,
        update: impl PopulationUpdate<G, S, F> + 'static,
    ) -> Self {
        Self {
            mapper: Arc::new(mapper),
            comparator: Arc::new(comparator),
            init: Box::new(init),
            update: Box::new(update),
        }
    }

    /// Rank a population with this evolver's comparator
    pub fn rank(&self, population: Vec<Individual<G, S, F>>) -> RankedPopulation<G, S, F> {
        DagPartialOrder::new(population, self.comparator.as_ref())
    }

    /// Run until `stop` holds and return the solutions of the final front
    ///
    /// Any mapping or evaluation failure aborts the run. Cancelling `runner`
    /// yields [`EvolutionError::Interrupted`], never a partial result.
    #[instrument(skip_all)]
    pub async fn run<R>(
        &self,
        fitness: Arc<dyn FitnessFunction<S, F>>,
        stop: &dyn StopCondition<G, S, F>,
        rng: &mut R,
        runner: &TaskRunner,
        listener: &dyn Listener<G, S, F>,
    ) -> Result<Vec<S>>
    where
        R: RngCore + Send,
    {
        let stopwatch = Instant::now();
        let mut state = State::new();

        let mut population = {
            let mut ctx = EvolutionContext {
                fitness: &fitness,
                mapper: &self.mapper,
                rng: &mut *rng,
                runner,
                state: &mut state,
            };
            self.init.init(&mut ctx).await?
        };
        debug!(individuals = population.len(), "Population initialized");

        loop {
            let ranked = Arc::new(self.rank(population));
            state.set_elapsed_millis(stopwatch.elapsed().as_millis() as u64);

            let event = Event::new(state, Arc::clone(&ranked));
            dispatch(listener, &event);

            if stop.should_stop(&event) {
                info!(
                    iterations = state.iterations(),
                    births = state.births(),
                    fitness_evaluations = state.fitness_evaluations(),
                    elapsed_ms = state.elapsed_millis(),
                    "Stop condition met"
                );
                // Same population and comparator: this ranking is the final one
                return Ok(ranked
                    .firsts()
                    .into_iter()
                    .map(|individual| individual.solution().clone())
                    .collect());
            }
            drop(event);

            if runner.is_cancelled() {
                return Err(EvolutionError::Interrupted);
            }

            population = {
                let mut ctx = EvolutionContext {
                    fitness: &fitness,
                    mapper: &self.mapper,
                    rng: &mut *rng,
                    runner,
                    state: &mut state,
                };
                self.update.update(&ranked, &mut ctx).await?
            };
            debug!(individuals = population.len(), "Population updated");
            state.inc_iterations(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{CachedFitness, IdentityMapper};
    use crate::listener::Deaf;
    use crate::order::FitnessOrder;
    use crate::stop::{Iterations, Never};
    use evolvo_common::{EvaluationError, MappingError};
    use parking_lot::Mutex;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::time::Duration;

    type Ind = Individual<i64, i64, i64>;

    fn counting_up(n: usize, _rng: &mut dyn RngCore) -> Vec<i64> {
        (1..=n as i64).collect()
    }

    fn negate() -> Arc<dyn FitnessFunction<i64, i64>> {
        Arc::new(|s: &i64| Ok::<_, EvaluationError>(-s))
    }

    /// Replaces every genotype with a random one in 0..100
    struct Shuffle;

    #[async_trait]
    impl PopulationUpdate<i64, i64, i64> for Shuffle {
        async fn update(
            &self,
            ranked: &RankedPopulation<i64, i64, i64>,
            ctx: &mut EvolutionContext<'_, i64, i64, i64>,
        ) -> Result<Vec<Ind>> {
            let genotypes = (0..ranked.len())
                .map(|_| ctx.rng.gen_range(0..100))
                .collect();
            ctx.build_individuals(genotypes).await
        }
    }

    fn evolver(size: usize) -> Evolver<i64, i64, i64> {
        Evolver::new(
            IdentityMapper,
            FitnessOrder,
            FactoryInit::new(counting_up, size),
            Shuffle,
        )
    }

    #[tokio::test]
    async fn test_immediate_stop_returns_initial_front() {
        let mut rng = StdRng::seed_from_u64(1);
        let stop = |_: &Event<i64, i64, i64>| true;

        let front = evolver(4)
            .run(negate(), &stop, &mut rng, &TaskRunner::unbounded(), &Deaf)
            .await
            .unwrap();

        assert_eq!(front, vec![4]);
    }

    #[tokio::test]
    async fn test_state_progression() {
        let mut rng = StdRng::seed_from_u64(2);
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = states.clone();
        let listener = move |e: &Event<i64, i64, i64>| sink.lock().push(*e.state());

        evolver(5)
            .run(
                negate(),
                &Iterations(3),
                &mut rng,
                &TaskRunner::unbounded(),
                &listener,
            )
            .await
            .unwrap();

        let states = states.lock();
        assert_eq!(states.len(), 4);
        for (i, state) in states.iter().enumerate() {
            assert_eq!(state.iterations(), i as u64);
            assert_eq!(state.births(), 5 * (i as u64 + 1));
            assert_eq!(state.fitness_evaluations(), state.births());
        }
    }

    #[tokio::test]
    async fn test_chained_listeners_see_every_event_in_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let log = Arc::new(Mutex::new(Vec::new()));
        let first_log = log.clone();
        let second_log = log.clone();
        let listener = (move |e: &Event<i64, i64, i64>| {
            first_log.lock().push(("first", e.state().iterations()))
        })
        .then(move |e: &Event<i64, i64, i64>| {
            second_log.lock().push(("second", e.state().iterations()))
        });

        evolver(3)
            .run(
                negate(),
                &Iterations(2),
                &mut rng,
                &TaskRunner::unbounded(),
                &listener,
            )
            .await
            .unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                ("first", 0),
                ("second", 0),
                ("first", 1),
                ("second", 1),
                ("first", 2),
                ("second", 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_listener_does_not_abort_run() {
        let mut rng = StdRng::seed_from_u64(8);
        let listener = |_: &Event<i64, i64, i64>| panic!("listener bug");

        let front = evolver(4)
            .run(negate(), &Iterations(1), &mut rng, &TaskRunner::unbounded(), &listener)
            .await
            .unwrap();

        assert!(!front.is_empty());
    }

    #[tokio::test]
    async fn test_cached_run_counts_distinct_evaluations() {
        let mut rng = StdRng::seed_from_u64(3);
        let cache = Arc::new(CachedFitness::new(negate()));
        let fitness: Arc<dyn FitnessFunction<i64, i64>> = cache.clone();
        let last = Arc::new(Mutex::new(State::new()));
        let sink = last.clone();
        let listener = move |e: &Event<i64, i64, i64>| *sink.lock() = *e.state();

        evolver(20)
            .run(fitness, &Iterations(5), &mut rng, &TaskRunner::unbounded(), &listener)
            .await
            .unwrap();

        let state = *last.lock();
        assert_eq!(state.births(), 120);
        assert_eq!(state.fitness_evaluations(), cache.stats().invocations);
        assert!(state.fitness_evaluations() < state.births());
    }

    #[tokio::test]
    async fn test_mapping_failure_aborts_run() {
        let mut rng = StdRng::seed_from_u64(4);
        let failing = |g: &i64| {
            if *g == 3 {
                Err(MappingError::new("unmappable"))
            } else {
                Ok(*g)
            }
        };
        let evolver = Evolver::new(
            failing,
            FitnessOrder,
            FactoryInit::new(counting_up, 4),
            Shuffle,
        );

        let err = evolver
            .run(negate(), &Never, &mut rng, &TaskRunner::unbounded(), &Deaf)
            .await
            .unwrap_err();

        assert!(matches!(err, EvolutionError::Mapping(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancellation_interrupts_run() {
        let mut rng = StdRng::seed_from_u64(5);
        let runner = TaskRunner::unbounded();
        let handle = runner.cancel_handle();
        let slow: Arc<dyn FitnessFunction<i64, i64>> = Arc::new(|s: &i64| {
            std::thread::sleep(Duration::from_millis(5));
            Ok::<_, EvaluationError>(-s)
        });

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });

        let err = evolver(8)
            .run(slow, &Never, &mut rng, &runner, &Deaf)
            .await
            .unwrap_err();

        assert!(err.is_interrupted());
    }

    #[tokio::test]
    async fn test_empty_population_yields_empty_result() {
        let mut rng = StdRng::seed_from_u64(6);
        let front = evolver(0)
            .run(negate(), &Iterations(2), &mut rng, &TaskRunner::unbounded(), &Deaf)
            .await
            .unwrap();

        assert!(front.is_empty());
    }
}
